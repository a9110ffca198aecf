use serde::{Deserialize, Serialize};

use lissage_core::codec::DEFAULT_JPEG_QUALITY;

use crate::error::EngineError;

/// Engine settings. Every field has a default, so an empty JSON object is
/// a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JPEG encoder quality, 1..=100.
    pub jpeg_quality: u8,
    /// Name of the worker thread.
    pub worker_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            worker_name: "lissage-engine".into(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(EngineError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.worker_name.is_empty() {
            return Err(EngineError::Config("worker_name must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_json_overrides_one_field() {
        let config: EngineConfig = serde_json::from_str(r#"{"jpeg_quality": 70}"#).unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert_eq!(config.worker_name, "lissage-engine");
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        for quality in [0, 101, 255] {
            let config = EngineConfig {
                jpeg_quality: quality,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(EngineError::Config(_))));
        }
    }

    #[test]
    fn empty_worker_name_is_rejected() {
        let config = EngineConfig {
            worker_name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
