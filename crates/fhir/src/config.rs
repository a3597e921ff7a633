//! Model runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into builders and
//! validators. Library code never reads process-wide environment variables itself, which keeps
//! behaviour consistent across threads and test harnesses.

use crate::{FhirError, FhirResult};

/// Environment variable controlling whether builders validate on `build()`.
pub const VALIDATING_ENV: &str = "FHIR_MODEL_VALIDATING";

/// Environment variable controlling reference target checks.
pub const CHECK_REFERENCE_TYPES_ENV: &str = "FHIR_MODEL_CHECK_REFERENCE_TYPES";

/// Settings consulted by builders and the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    validating: bool,
    check_reference_types: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            validating: true,
            check_reference_types: true,
        }
    }
}

impl ModelConfig {
    pub const fn new(validating: bool, check_reference_types: bool) -> Self {
        Self {
            validating,
            check_reference_types,
        }
    }

    /// Configuration for bulk construction: `build()` skips the validator entirely.
    pub const fn lenient() -> Self {
        Self::new(false, true)
    }

    /// Run the validator on `build()`.
    pub const fn validating(&self) -> bool {
        self.validating
    }

    /// Check reference targets against each field's allowed types.
    pub const fn check_reference_types(&self) -> bool {
        self.check_reference_types
    }

    pub const fn with_validating(self, validating: bool) -> Self {
        Self { validating, ..self }
    }

    pub const fn with_check_reference_types(self, check_reference_types: bool) -> Self {
        Self {
            check_reference_types,
            ..self
        }
    }

    /// Build a configuration from raw environment values.
    ///
    /// Missing or blank values fall back to the defaults.
    pub fn from_env_values(
        validating: Option<String>,
        check_reference_types: Option<String>,
    ) -> FhirResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            validating: flag_from_env_value(VALIDATING_ENV, validating, defaults.validating)?,
            check_reference_types: flag_from_env_value(
                CHECK_REFERENCE_TYPES_ENV,
                check_reference_types,
                defaults.check_reference_types,
            )?,
        })
    }
}

/// Parse a boolean flag from an optional environment value.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively. If `value` is `None`
/// or empty/whitespace, returns `default`.
pub fn flag_from_env_value(name: &str, value: Option<String>, default: bool) -> FhirResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => Err(FhirError::InvalidInput(format!(
            "{name} must be a boolean flag, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_and_check_references() {
        let config = ModelConfig::default();
        assert!(config.validating());
        assert!(config.check_reference_types());
        assert!(!ModelConfig::lenient().validating());
    }

    #[test]
    fn flag_parsing_accepts_common_spellings() {
        for (raw, expected) in [("TRUE", true), (" yes ", true), ("1", true), ("Off", false)] {
            let parsed = flag_from_env_value("X", Some(raw.to_string()), !expected)
                .expect("valid flag");
            assert_eq!(parsed, expected, "input {raw:?}");
        }
    }

    #[test]
    fn blank_flag_uses_default() {
        assert!(flag_from_env_value("X", None, true).expect("default"));
        assert!(!flag_from_env_value("X", Some("  ".into()), false).expect("default"));
    }

    #[test]
    fn invalid_flag_names_the_variable() {
        let err = ModelConfig::from_env_values(None, Some("maybe".into()))
            .expect_err("should reject");
        assert!(
            matches!(err, FhirError::InvalidInput(msg) if msg.contains(CHECK_REFERENCE_TYPES_ENV))
        );
    }

    #[test]
    fn env_values_override_defaults() {
        let config = ModelConfig::from_env_values(Some("false".into()), Some("no".into()))
            .expect("valid config");
        assert_eq!(config, ModelConfig::new(false, false));
    }
}
