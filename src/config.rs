//! Analysis configuration.
//!
//! One immutable value constructed per run and passed by reference into every
//! component. Loadable from a `migramap.toml`; every field has a default so a
//! partial file works.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::FrameworkKind;
use crate::errors::{AnalysisError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Glob patterns for paths skipped entirely (directories and files).
    #[serde(default = "default_ignored_path_globs")]
    pub ignored_path_globs: Vec<String>,

    /// Per-file read ceiling in bytes. Larger files are skipped.
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Global budget on source files scanned in one run.
    #[serde(default = "default_max_files_to_scan")]
    pub max_files_to_scan: usize,

    /// Minimum confidence per framework label, overriding detector defaults.
    #[serde(default)]
    pub framework_score_thresholds: BTreeMap<FrameworkKind, f64>,

    /// File suffixes eligible for structural parsing.
    #[serde(default = "default_source_extensions")]
    pub supported_source_extensions: Vec<String>,
}

fn default_ignored_path_globs() -> Vec<String> {
    [
        "**/vendor/**",
        "**/node_modules/**",
        "**/.git/**",
        "**/storage/**",
        "**/cache/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_file_size_bytes() -> u64 {
    1_048_576
}

fn default_max_files_to_scan() -> usize {
    10_000
}

fn default_source_extensions() -> Vec<String> {
    ["php", "phtml", "inc"].iter().map(|s| s.to_string()).collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ignored_path_globs: default_ignored_path_globs(),
            max_file_size_bytes: default_max_file_size_bytes(),
            max_files_to_scan: default_max_files_to_scan(),
            framework_score_thresholds: BTreeMap::new(),
            supported_source_extensions: default_source_extensions(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a TOML file. Unknown keys are ignored, missing keys default.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: AnalysisConfig =
            toml::from_str(&raw).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Threshold for one framework, falling back to the detector default.
    pub fn threshold_for(&self, kind: FrameworkKind, detector_default: f64) -> f64 {
        self.framework_score_thresholds
            .get(&kind)
            .copied()
            .unwrap_or(detector_default)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_files_to_scan == 0 {
            return Err(AnalysisError::Config(
                "max_files_to_scan must be at least 1".into(),
            ));
        }
        if self.max_file_size_bytes == 0 {
            return Err(AnalysisError::Config(
                "max_file_size_bytes must be at least 1".into(),
            ));
        }
        for (kind, threshold) in &self.framework_score_thresholds {
            if !(0.0..=1.0).contains(threshold) {
                return Err(AnalysisError::Config(format!(
                    "threshold for {kind} must be between 0.0 and 1.0"
                )));
            }
        }
        if self.supported_source_extensions.is_empty() {
            return Err(AnalysisError::Config(
                "supported_source_extensions must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// True when `ext` (without the dot) is eligible for parsing.
    pub fn is_source_extension(&self, ext: &str) -> bool {
        self.supported_source_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_source_extension("php"));
        assert!(config.is_source_extension("PHP"));
        assert!(!config.is_source_extension("py"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AnalysisConfig = toml::from_str("max_files_to_scan = 50").unwrap();
        assert_eq!(config.max_files_to_scan, 50);
        assert_eq!(config.max_file_size_bytes, 1_048_576);
        assert!(!config.ignored_path_globs.is_empty());
    }

    #[test]
    fn threshold_override_wins_over_detector_default() {
        let mut config = AnalysisConfig::default();
        config
            .framework_score_thresholds
            .insert(FrameworkKind::Laravel, 0.6);
        assert_eq!(config.threshold_for(FrameworkKind::Laravel, 0.3), 0.6);
        assert_eq!(config.threshold_for(FrameworkKind::Slim, 0.4), 0.4);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = AnalysisConfig::default();
        config
            .framework_score_thresholds
            .insert(FrameworkKind::Slim, 1.5);
        assert!(config.validate().is_err());
    }
}
