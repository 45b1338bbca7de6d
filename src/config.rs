//! Interpretation settings

use crate::constants::chunks::{MAX_CODEPOINTS_PER_CHUNK, MIN_CODEPOINTS_PER_CHUNK};
use crate::constants::error_types::INVALID_SETTING;
use crate::error::{ErrorType, Result, RiftError};
use serde::{Deserialize, Serialize};

/// Tuning knobs for an [`Interpretation`](crate::interpretation::Interpretation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpretationConfig {
    /// Upper bound on codepoints per chunk
    pub max_codepoints_per_chunk: usize,
    /// Run a full integrity check after every edit batch and panic on mismatch
    pub verify_after_edit: bool,
}

impl Default for InterpretationConfig {
    fn default() -> Self {
        Self {
            max_codepoints_per_chunk: MAX_CODEPOINTS_PER_CHUNK,
            verify_after_edit: false,
        }
    }
}

impl InterpretationConfig {
    /// Parse from JSON, filling missing fields with defaults, then validate.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_codepoints_per_chunk < MIN_CODEPOINTS_PER_CHUNK {
            return Err(RiftError::new(
                ErrorType::Settings,
                INVALID_SETTING,
                format!(
                    "max_codepoints_per_chunk must be at least {} (got {})",
                    MIN_CODEPOINTS_PER_CHUNK, self.max_codepoints_per_chunk
                ),
            ));
        }
        Ok(())
    }

    /// Builder-style override of the chunk bound
    #[must_use]
    pub fn with_max_codepoints_per_chunk(mut self, max: usize) -> Self {
        self.max_codepoints_per_chunk = max;
        self
    }

    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_after_edit = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InterpretationConfig::default();
        assert_eq!(config.max_codepoints_per_chunk, 1000);
        assert!(!config.verify_after_edit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = InterpretationConfig::from_json(r#"{"verify_after_edit": true}"#).unwrap();
        assert_eq!(config.max_codepoints_per_chunk, 1000);
        assert!(config.verify_after_edit);
    }

    #[test]
    fn test_full_json() {
        let config =
            InterpretationConfig::from_json(r#"{"max_codepoints_per_chunk": 16}"#).unwrap();
        assert_eq!(config.max_codepoints_per_chunk, 16);
    }

    #[test]
    fn test_rejects_tiny_chunks() {
        let err = InterpretationConfig::from_json(r#"{"max_codepoints_per_chunk": 1}"#)
            .unwrap_err();
        assert_eq!(err.kind, ErrorType::Settings);
        assert_eq!(err.code, INVALID_SETTING);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = InterpretationConfig::from_json("{ nope").unwrap_err();
        assert_eq!(err.kind, ErrorType::Parse);
    }

    #[test]
    fn test_builders() {
        let config = InterpretationConfig::default()
            .with_max_codepoints_per_chunk(8)
            .with_verification(true);
        assert_eq!(config.max_codepoints_per_chunk, 8);
        assert!(config.verify_after_edit);
    }
}
