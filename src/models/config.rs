//! Architecture descriptions read from a variant's `config.json`.
//!
//! The file is optional; missing fields use the defaults below, which match
//! the published doodle models.

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::{MODEL_INPUT_LEN, MODEL_INPUT_SIDE, NUM_CLASSES};
use crate::core::validation::{validate_non_empty, validate_positive};
use serde::{Deserialize, Serialize};

fn default_input_size() -> usize {
    MODEL_INPUT_LEN
}

fn default_input_side() -> usize {
    MODEL_INPUT_SIDE as usize
}

fn default_num_classes() -> usize {
    NUM_CLASSES
}

fn default_hidden_sizes() -> Vec<usize> {
    vec![128, 64]
}

fn default_in_channels() -> usize {
    1
}

fn default_channels() -> Vec<usize> {
    vec![32, 64]
}

fn default_kernel_size() -> usize {
    3
}

fn default_padding() -> usize {
    1
}

fn default_hidden_size() -> usize {
    128
}

/// Fully connected network: `input -> hidden... -> classes`, ReLU between layers.
///
/// Layers are named `fc1` to `fcN` in the weights file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardConfig {
    #[serde(default = "default_input_size")]
    pub input_size: usize,
    #[serde(default = "default_hidden_sizes")]
    pub hidden_sizes: Vec<usize>,
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
}

impl Default for FeedForwardConfig {
    fn default() -> Self {
        Self {
            input_size: default_input_size(),
            hidden_sizes: default_hidden_sizes(),
            num_classes: default_num_classes(),
        }
    }
}

impl ConfigValidator for FeedForwardConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive(self.input_size, "input_size")?;
        validate_positive(self.num_classes, "num_classes")?;
        for &size in &self.hidden_sizes {
            validate_positive(size, "hidden_sizes")?;
        }
        Ok(())
    }
}

/// Convolutional network: per stage a `kernel_size` convolution, ReLU and
/// 2x2 max-pool (`conv1`..`convN`), then `fc1` with ReLU and the `fc2` head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvNetConfig {
    #[serde(default = "default_input_side")]
    pub input_side: usize,
    #[serde(default = "default_in_channels")]
    pub in_channels: usize,
    #[serde(default = "default_channels")]
    pub channels: Vec<usize>,
    #[serde(default = "default_kernel_size")]
    pub kernel_size: usize,
    #[serde(default = "default_padding")]
    pub padding: usize,
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
}

impl Default for ConvNetConfig {
    fn default() -> Self {
        Self {
            input_side: default_input_side(),
            in_channels: default_in_channels(),
            channels: default_channels(),
            kernel_size: default_kernel_size(),
            padding: default_padding(),
            hidden_size: default_hidden_size(),
            num_classes: default_num_classes(),
        }
    }
}

impl ConvNetConfig {
    /// Number of input values (`in_channels * side * side`).
    pub fn input_len(&self) -> usize {
        self.in_channels * self.input_side * self.input_side
    }

    /// Spatial side length after all conv/pool stages, or `None` if a stage
    /// would shrink the feature map to nothing.
    pub fn feature_side(&self) -> Option<usize> {
        let mut side = self.input_side;
        for _ in &self.channels {
            side = (side + 2 * self.padding).checked_sub(self.kernel_size)? + 1;
            side /= 2;
            if side == 0 {
                return None;
            }
        }
        Some(side)
    }

    /// Length of the flattened feature vector fed to `fc1`.
    pub fn flattened_len(&self) -> Option<usize> {
        let side = self.feature_side()?;
        let channels = self.channels.last().copied().unwrap_or(self.in_channels);
        Some(channels * side * side)
    }
}

impl ConfigValidator for ConvNetConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive(self.input_side, "input_side")?;
        validate_positive(self.in_channels, "in_channels")?;
        validate_non_empty(&self.channels, "channels")?;
        for &c in &self.channels {
            validate_positive(c, "channels")?;
        }
        validate_positive(self.kernel_size, "kernel_size")?;
        validate_positive(self.hidden_size, "hidden_size")?;
        validate_positive(self.num_classes, "num_classes")?;
        if self.feature_side().is_none() {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "{} conv stages with kernel {} and padding {} shrink a {}px input to nothing",
                    self.channels.len(),
                    self.kernel_size,
                    self.padding,
                    self.input_side
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv_defaults() {
        let config = ConvNetConfig::default();
        assert_eq!(config.input_len(), 784);
        // 28 -> 14 -> 7
        assert_eq!(config.feature_side(), Some(7));
        assert_eq!(config.flattened_len(), Some(64 * 7 * 7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_conv_without_padding() {
        let config = ConvNetConfig {
            kernel_size: 5,
            padding: 0,
            ..ConvNetConfig::default()
        };
        // 28 -> 24 -> 12 -> 8 -> 4
        assert_eq!(config.feature_side(), Some(4));
    }

    #[test]
    fn test_conv_too_deep_rejected() {
        let config = ConvNetConfig {
            channels: vec![8; 6],
            ..ConvNetConfig::default()
        };
        assert_eq!(config.feature_side(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_feed_forward_partial_json() {
        let config: FeedForwardConfig = serde_json::from_str(r#"{"hidden_sizes": [32]}"#).unwrap();
        assert_eq!(config.input_size, 784);
        assert_eq!(config.hidden_sizes, vec![32]);
        assert_eq!(config.num_classes, 10);
    }

    #[test]
    fn test_feed_forward_zero_hidden_rejected() {
        let config = FeedForwardConfig {
            hidden_sizes: vec![16, 0],
            ..FeedForwardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
