//! Convolutional doodle classifier.

use super::config::ConvNetConfig;
use super::weights::{candle_to_inference, layer_load_error, load_architecture, load_var_builder};
use crate::core::errors::{DoodleError, DoodleResult};
use crate::core::traits::Classifier;
use candle_core::{Device, Tensor};
use candle_nn::{Conv2d, Conv2dConfig, Linear, Module, VarBuilder};
use ndarray::ArrayView1;
use std::path::Path;

const MODEL_NAME: &str = "convolutional";

/// Small CNN over the 28x28 raster.
///
/// Each stage is conv + ReLU + 2x2 max-pool; the feature map is then
/// flattened into a hidden layer and the class head.
#[derive(Debug)]
pub struct ConvNet {
    config: ConvNetConfig,
    convs: Vec<Conv2d>,
    fc1: Linear,
    fc2: Linear,
    device: Device,
}

fn build_layers(
    config: &ConvNetConfig,
    vb: &VarBuilder,
    on_error: impl Fn(&str, candle_core::Error) -> DoodleError,
) -> DoodleResult<(Vec<Conv2d>, Linear, Linear)> {
    let flattened = config.flattened_len().ok_or_else(|| {
        DoodleError::config_error("convolution stages shrink the input to nothing")
    })?;

    let mut convs = Vec::with_capacity(config.channels.len());
    let mut in_channels = config.in_channels;
    for (i, &out_channels) in config.channels.iter().enumerate() {
        let name = format!("conv{}", i + 1);
        let conv_cfg = Conv2dConfig {
            padding: config.padding,
            ..Default::default()
        };
        let conv = candle_nn::conv2d(
            in_channels,
            out_channels,
            config.kernel_size,
            conv_cfg,
            vb.pp(&name),
        )
        .map_err(|e| on_error(name.as_str(), e))?;
        convs.push(conv);
        in_channels = out_channels;
    }

    let fc1 = candle_nn::linear(flattened, config.hidden_size, vb.pp("fc1"))
        .map_err(|e| on_error("fc1", e))?;
    let fc2 = candle_nn::linear(config.hidden_size, config.num_classes, vb.pp("fc2"))
        .map_err(|e| on_error("fc2", e))?;
    Ok((convs, fc1, fc2))
}

impl ConvNet {
    /// Builds the network from a variable builder.
    pub fn load(config: ConvNetConfig, vb: VarBuilder, device: Device) -> DoodleResult<Self> {
        let (convs, fc1, fc2) = build_layers(&config, &vb, |layer, e| {
            DoodleError::model_load_error(
                MODEL_NAME,
                format!("cannot build layer '{}'", layer),
                None,
                Some(e),
            )
        })?;
        Ok(Self {
            config,
            convs,
            fc1,
            fc2,
            device,
        })
    }

    /// Loads `config.json` (optional) and `model.safetensors` from `model_dir`.
    ///
    /// # Errors
    ///
    /// `ModelLoad` if the weights are missing, corrupt or do not fit the
    /// architecture.
    pub fn from_dir(model_dir: impl AsRef<Path>, device: Device) -> DoodleResult<Self> {
        let model_dir = model_dir.as_ref();
        let config: ConvNetConfig = load_architecture(model_dir)?;
        let vb = load_var_builder(model_dir, &device)?;
        let (convs, fc1, fc2) =
            build_layers(&config, &vb, |layer, e| layer_load_error(model_dir, layer, e))?;
        Ok(Self {
            config,
            convs,
            fc1,
            fc2,
            device,
        })
    }

    /// Architecture this network was built with.
    pub fn config(&self) -> &ConvNetConfig {
        &self.config
    }

    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let side = self.config.input_side;
        let mut xs = xs.reshape((1, self.config.in_channels, side, side))?;
        for conv in &self.convs {
            xs = conv.forward(&xs)?.relu()?.max_pool2d(2)?;
        }
        let xs = xs.flatten_from(1)?;
        let xs = self.fc1.forward(&xs)?.relu()?;
        self.fc2.forward(&xs)
    }
}

impl Classifier for ConvNet {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn input_len(&self) -> usize {
        self.config.input_len()
    }

    fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    fn logits(&self, input: ArrayView1<'_, f32>) -> DoodleResult<Vec<f32>> {
        let data: Vec<f32> = input.iter().copied().collect();
        let xs = Tensor::from_vec(data, self.config.input_len(), &self.device)
            .map_err(|e| candle_to_inference(MODEL_NAME, "create input tensor", e))?;
        let logits = self
            .forward(&xs)
            .map_err(|e| candle_to_inference(MODEL_NAME, "forward pass", e))?;
        logits
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| candle_to_inference(MODEL_NAME, "read logits", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::batch::Tensor1D;
    use crate::models::test_support::write_conv_fixture;
    use candle_core::DType;
    use candle_nn::VarMap;

    fn small_config() -> ConvNetConfig {
        ConvNetConfig {
            channels: vec![2, 4],
            hidden_size: 8,
            ..ConvNetConfig::default()
        }
    }

    #[test]
    fn test_zero_weights_give_uniform_distribution() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let net = ConvNet::load(small_config(), vb, Device::Cpu).unwrap();
        let prediction = net.predict(&Tensor1D::from_elem(784, 1.0)).unwrap();
        for &p in prediction.probabilities() {
            assert!((p - 0.1).abs() < 1e-9);
        }
        assert_eq!(prediction.class_index(), 0);
    }

    #[test]
    fn test_wrong_input_length_is_shape_mismatch() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let net = ConvNet::load(small_config(), vb, Device::Cpu).unwrap();
        let err = net.predict(&Tensor1D::zeros(28 * 27)).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_random_weights_are_deterministic() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let net = ConvNet::load(small_config(), vb, Device::Cpu).unwrap();

        let input = Tensor1D::from_shape_fn(784, |i| if (i / 28) % 4 == 0 { 1.0 } else { 0.0 });
        let first = net.predict(&input).unwrap();
        let second = net.predict(&input).unwrap();
        assert_eq!(first, second);
        let sum: f64 = first.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_dir_reads_fixture() {
        let dir = tempfile::tempdir().unwrap();
        write_conv_fixture(dir.path(), 4);
        let net = ConvNet::from_dir(dir.path(), Device::Cpu).unwrap();
        assert_eq!(net.config().channels, vec![2, 4]);

        let prediction = net.predict(&Tensor1D::zeros(784)).unwrap();
        assert_eq!(prediction.class_index(), 4);
    }

    #[test]
    fn test_from_dir_missing_layer() {
        let dir = tempfile::tempdir().unwrap();
        write_conv_fixture(dir.path(), 4);
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"channels": [2, 4, 8], "hidden_size": 8}"#,
        )
        .unwrap();

        let err = ConvNet::from_dir(dir.path(), Device::Cpu).unwrap_err();
        assert!(matches!(err, DoodleError::ModelLoad { .. }));
    }
}
