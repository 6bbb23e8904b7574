//! Input validation helpers used by configuration and pipeline components.

use crate::core::config::ConfigError;

/// Validates that a float value is finite (not NaN or infinite).
#[inline]
pub fn validate_finite(value: f32, param_name: &str) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidConfig {
            message: format!("Parameter '{}' must be finite, got: {}", param_name, value),
        });
    }
    Ok(())
}

/// Validates that a value is within a specified range (inclusive).
#[inline]
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
    param_name: &str,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::InvalidConfig {
            message: format!(
                "Parameter '{}' must be in range [{}, {}], got: {}",
                param_name, min, max, value
            ),
        });
    }
    Ok(())
}

/// Validates that a value is positive (> 0).
#[inline]
pub fn validate_positive<T: PartialOrd + std::fmt::Display + Default>(
    value: T,
    param_name: &str,
) -> Result<(), ConfigError> {
    if value <= T::default() {
        return Err(ConfigError::InvalidConfig {
            message: format!(
                "Parameter '{}' must be positive, got: {}",
                param_name, value
            ),
        });
    }
    Ok(())
}

/// Validates that a collection is not empty.
#[inline]
pub fn validate_non_empty<T>(items: &[T], param_name: &str) -> Result<(), ConfigError> {
    if items.is_empty() {
        return Err(ConfigError::InvalidConfig {
            message: format!("Parameter '{}' cannot be empty", param_name),
        });
    }
    Ok(())
}
