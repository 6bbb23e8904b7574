//! Fully connected doodle classifier.

use super::config::FeedForwardConfig;
use super::weights::{candle_to_inference, layer_load_error, load_architecture, load_var_builder};
use crate::core::errors::{DoodleError, DoodleResult};
use crate::core::traits::Classifier;
use candle_core::{Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use ndarray::ArrayView1;
use std::path::Path;

const MODEL_NAME: &str = "feed_forward";

/// Multi-layer perceptron over the flattened 28x28 raster.
#[derive(Debug)]
pub struct FeedForwardNet {
    config: FeedForwardConfig,
    layers: Vec<Linear>,
    device: Device,
}

fn build_layers(
    config: &FeedForwardConfig,
    vb: &VarBuilder,
    on_error: impl Fn(&str, candle_core::Error) -> DoodleError,
) -> DoodleResult<Vec<Linear>> {
    let mut sizes = Vec::with_capacity(config.hidden_sizes.len() + 2);
    sizes.push(config.input_size);
    sizes.extend_from_slice(&config.hidden_sizes);
    sizes.push(config.num_classes);

    sizes
        .windows(2)
        .enumerate()
        .map(|(i, dims)| {
            let name = format!("fc{}", i + 1);
            candle_nn::linear(dims[0], dims[1], vb.pp(&name)).map_err(|e| on_error(name.as_str(), e))
        })
        .collect()
}

impl FeedForwardNet {
    /// Builds the network from a variable builder.
    ///
    /// Layers are read as `fc1`..`fcN`, where `N = hidden_sizes.len() + 1`.
    pub fn load(config: FeedForwardConfig, vb: VarBuilder, device: Device) -> DoodleResult<Self> {
        let layers = build_layers(&config, &vb, |layer, e| {
            DoodleError::model_load_error(
                MODEL_NAME,
                format!("cannot build layer '{}'", layer),
                None,
                Some(e),
            )
        })?;
        Ok(Self {
            config,
            layers,
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
        let config: FeedForwardConfig = load_architecture(model_dir)?;
        let vb = load_var_builder(model_dir, &device)?;
        let layers = build_layers(&config, &vb, |layer, e| layer_load_error(model_dir, layer, e))?;
        Ok(Self {
            config,
            layers,
            device,
        })
    }

    /// Architecture this network was built with.
    pub fn config(&self) -> &FeedForwardConfig {
        &self.config
    }

    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let last = self.layers.len().saturating_sub(1);
        let mut xs = xs.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i < last {
                xs = xs.relu()?;
            }
        }
        Ok(xs)
    }
}

impl Classifier for FeedForwardNet {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn input_len(&self) -> usize {
        self.config.input_size
    }

    fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    fn logits(&self, input: ArrayView1<'_, f32>) -> DoodleResult<Vec<f32>> {
        let data: Vec<f32> = input.iter().copied().collect();
        let xs = Tensor::from_vec(data, (1, self.config.input_size), &self.device)
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
