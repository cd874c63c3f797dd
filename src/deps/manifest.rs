//! composer.json parsing.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::errors::{AnalysisError, Result};

/// The slice of composer.json the resolver consumes. Unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub require: BTreeMap<String, String>,
    #[serde(default, rename = "require-dev")]
    pub require_dev: BTreeMap<String, String>,
}

impl ComposerManifest {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| AnalysisError::Config(format!("invalid composer.json: {e}")))
    }

    pub fn declared_count(&self) -> usize {
        self.require.len() + self.require_dev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_require_and_require_dev() {
        let manifest = ComposerManifest::parse(
            r#"{
                "name": "acme/shop",
                "require": {"php": ">=8.1", "laravel/framework": "^10.0"},
                "require-dev": {"phpunit/phpunit": "^10.0"}
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("acme/shop"));
        assert_eq!(manifest.require.len(), 2);
        assert_eq!(manifest.require_dev.len(), 1);
        assert_eq!(manifest.declared_count(), 3);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let manifest = ComposerManifest::parse("{}").unwrap();
        assert_eq!(manifest.declared_count(), 0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(ComposerManifest::parse("{not json").is_err());
    }
}
