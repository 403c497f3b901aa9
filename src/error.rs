//! Error types for the mablane library.

use thiserror::Error;

/// Result type alias for bandit operations.
pub type Result<T> = std::result::Result<T, BanditError>;

/// Errors that can occur while configuring or running a bandit agent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    /// No arms are available to the agent.
    #[error("no arms available")]
    NoArmsAvailable,

    /// A per-arm array does not match the number of arms.
    #[error("dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Unknown strategy or arm name.
    #[error("unknown {kind}: {name}")]
    Unknown { kind: &'static str, name: String },

    /// A simulation configuration could not be parsed.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl BanditError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BanditError::InvalidParameter {
            message: message.into(),
        }
    }
}

/// Fails with [`BanditError::InvalidParameter`] unless `value` is finite and
/// inside the inclusive range.
pub(crate) fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(BanditError::invalid(format!(
            "{name} must be between {min} and {max}, got {value}"
        )))
    }
}

/// Fails unless `value` is finite and strictly positive.
pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BanditError::invalid(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// Fails unless `value` is finite and not negative.
pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BanditError::invalid(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BanditError::NoArmsAvailable;
        assert_eq!(err.to_string(), "no arms available");

        let err = BanditError::InvalidParameter {
            message: "epsilon must be between 0 and 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter: epsilon must be between 0 and 1"
        );

        let err = BanditError::Unknown {
            kind: "strategy",
            name: "ucb9".to_string(),
        };
        assert_eq!(err.to_string(), "unknown strategy: ucb9");
    }

    #[test]
    fn test_parameter_checks() {
        assert!(check_range("epsilon", 0.5, 0.0, 1.0).is_ok());
        assert!(check_range("epsilon", 1.5, 0.0, 1.0).is_err());
        assert!(check_range("epsilon", f64::NAN, 0.0, 1.0).is_err());

        assert!(check_positive("tau", 0.01).is_ok());
        assert!(check_positive("tau", 0.0).is_err());
        assert!(check_positive("tau", f64::INFINITY).is_err());

        assert!(check_non_negative("b", 0.0).is_ok());
        assert!(check_non_negative("b", -1.0).is_err());
    }
}
