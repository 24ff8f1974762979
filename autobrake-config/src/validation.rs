//! Custom validation functions for configuration.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

static LOG_LEVEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("^(?i)(trace|debug|info|warn|error)$").ok());

/// Validate a tracing level name (case-insensitive).
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let re = LOG_LEVEL
        .as_ref()
        .ok_or_else(|| ValidationError::new("invalid_regex"))?;
    if re.is_match(level) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Reject `NaN` and infinities, which `range` lets through.
pub fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        let mut error = ValidationError::new("not_finite");
        error.message = Some("must be a finite number".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_levels() {
        for level in ["trace", "DEBUG", "Info", "warn", "error"] {
            assert!(validate_log_level(level).is_ok(), "{level}");
        }
    }

    #[test]
    fn rejects_filter_directives() {
        assert!(validate_log_level("autobrake_core=debug").is_err());
        assert!(validate_log_level("").is_err());
    }

    #[test]
    fn finite_numbers_only() {
        assert!(validate_finite(0.0).is_ok());
        assert!(validate_finite(-3.5).is_ok());
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(validate_finite(value).is_err(), "{value}");
        }
    }
}
