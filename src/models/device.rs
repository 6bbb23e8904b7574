//! Candle device selection.

use crate::core::errors::DoodleError;
use candle_core::Device;

#[cfg(not(feature = "cuda"))]
fn cuda_not_enabled() -> DoodleError {
    DoodleError::config_error("CUDA support not enabled. Compile with --features cuda")
}

/// Parses a device string and creates a Candle [`Device`].
///
/// # Supported formats
///
/// - `"cpu"` → CPU device
/// - `"cuda"` or `"gpu"` → CUDA device 0
/// - `"cuda:N"` → CUDA device N (e.g., `"cuda:1"`)
///
/// # Errors
///
/// Returns a configuration error if the string is not recognized, or CUDA
/// is requested without the `cuda` feature.
pub fn parse_device(device_str: &str) -> Result<Device, DoodleError> {
    let device_str = device_str.trim().to_lowercase();
    match device_str.as_str() {
        "cpu" => Ok(Device::Cpu),
        "cuda" | "gpu" => {
            #[cfg(feature = "cuda")]
            {
                Device::new_cuda(0).map_err(|e| {
                    DoodleError::config_error(format!("Failed to create CUDA device: {}", e))
                })
            }
            #[cfg(not(feature = "cuda"))]
            {
                Err(cuda_not_enabled())
            }
        }
        s if s.starts_with("cuda:") => {
            let ordinal: usize = s["cuda:".len()..].parse().map_err(|_| {
                DoodleError::config_error(format!("Invalid CUDA device ordinal in '{}'", s))
            })?;
            #[cfg(feature = "cuda")]
            {
                Device::new_cuda(ordinal).map_err(|e| {
                    DoodleError::config_error(format!(
                        "Failed to create CUDA device {}: {}",
                        ordinal, e
                    ))
                })
            }
            #[cfg(not(feature = "cuda"))]
            {
                let _ = ordinal;
                Err(cuda_not_enabled())
            }
        }
        _ => Err(DoodleError::config_error(format!(
            "Unknown device: '{}'. Use 'cpu', 'cuda', or 'cuda:N'",
            device_str
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu() {
        assert!(matches!(parse_device("cpu"), Ok(Device::Cpu)));
        assert!(matches!(parse_device(" CPU "), Ok(Device::Cpu)));
    }

    #[test]
    fn test_parse_unknown() {
        assert!(parse_device("tpu").is_err());
        assert!(parse_device("cuda:x").is_err());
    }
}
