//! Framework detection.
//!
//! Each candidate framework is a [`FrameworkDetector`] behind one trait,
//! evaluated in an explicit precedence order; the first candidate clearing
//! its minimum score wins. Ties break on precedence, never on raw score,
//! because generic slim-style layouts can spuriously out-score more specific
//! signatures.

pub mod classifier;
pub mod signatures;

use std::collections::BTreeSet;

use crate::core::FrameworkKind;

pub use classifier::FrameworkClassifier;

/// A capped sample of one file's content used for content-pattern matching.
#[derive(Debug, Clone)]
pub struct FileSample {
    /// Relative path, forward slashes, lowercase.
    pub relative: String,
    pub content: String,
}

/// Read-only view over the tree that detectors score against.
#[derive(Debug)]
pub struct ProjectEvidence<'a> {
    /// Relative paths of every file and directory, forward slashes,
    /// lowercase.
    pub paths: &'a BTreeSet<String>,
    /// Raw composer.json text, when present.
    pub manifest: Option<&'a str>,
    pub samples: &'a [FileSample],
}

impl ProjectEvidence<'_> {
    /// True when `marker` names an existing directory or path suffix, e.g.
    /// `app/http/controllers` matches itself anywhere in the tree.
    pub fn has_path(&self, marker: &str) -> bool {
        self.paths.iter().any(|p| {
            p == marker
                || p.ends_with(&format!("/{marker}"))
                || p.starts_with(&format!("{marker}/"))
                || p.contains(&format!("/{marker}/"))
        })
    }

    pub fn manifest_mentions(&self, package: &str) -> bool {
        self.manifest
            .map(|m| m.contains(package))
            .unwrap_or(false)
    }

    pub fn any_sample_matches(&self, pattern: &regex::Regex) -> bool {
        self.samples.iter().any(|s| pattern.is_match(&s.content))
    }
}

/// Weighted match result: `matched / total` is the confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureScore {
    pub matched: f64,
    pub total: f64,
}

impl SignatureScore {
    pub fn zero() -> Self {
        Self {
            matched: 0.0,
            total: 1.0,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total <= 0.0 {
            0.0
        } else {
            (self.matched / self.total).clamp(0.0, 1.0)
        }
    }
}

/// One candidate framework's recognition logic.
pub trait FrameworkDetector: Send + Sync {
    fn kind(&self) -> FrameworkKind;

    /// Minimum match ratio required to claim the project. Overridable per
    /// label via `framework_score_thresholds`.
    fn default_threshold(&self) -> f64;

    fn score(&self, evidence: &ProjectEvidence) -> SignatureScore;
}
