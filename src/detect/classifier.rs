//! Precedence-ordered framework classification.

use super::signatures;
use super::{FrameworkDetector, ProjectEvidence};
use crate::config::AnalysisConfig;
use crate::core::{FrameworkDetection, FrameworkKind};

pub struct FrameworkClassifier<'cfg> {
    config: &'cfg AnalysisConfig,
    detectors: Vec<Box<dyn FrameworkDetector>>,
}

impl<'cfg> FrameworkClassifier<'cfg> {
    /// Detectors run in this order; the first to clear its threshold wins.
    /// Custom/native detection comes first so a generic framework signature
    /// cannot claim a hand-rolled router that merely shares a `src/` +
    /// `public/` layout.
    pub fn new(config: &'cfg AnalysisConfig) -> Self {
        let detectors: Vec<Box<dyn FrameworkDetector>> = vec![
            Box::new(signatures::CustomWithComposerDetector::new()),
            Box::new(signatures::CustomMvcDetector::new()),
            Box::new(signatures::laravel()),
            Box::new(signatures::symfony()),
            Box::new(signatures::codeigniter()),
            Box::new(signatures::slim()),
        ];
        Self { config, detectors }
    }

    /// Always returns exactly one label and a confidence in [0, 1].
    pub fn classify(&self, evidence: &ProjectEvidence) -> FrameworkDetection {
        let mut best_ratio: f64 = 0.0;
        for detector in &self.detectors {
            let score = detector.score(evidence);
            let ratio = score.ratio();
            let threshold = self
                .config
                .threshold_for(detector.kind(), detector.default_threshold());
            log::debug!(
                "framework {}: score {:.2} (threshold {:.2})",
                detector.kind(),
                ratio,
                threshold
            );
            if ratio > 0.0 && ratio >= threshold {
                return FrameworkDetection {
                    kind: detector.kind(),
                    confidence: ratio,
                };
            }
            best_ratio = best_ratio.max(ratio);
        }
        // Nothing cleared its threshold: the weaker the best candidate, the
        // more confident the vanilla fallback.
        FrameworkDetection {
            kind: FrameworkKind::Vanilla,
            confidence: (1.0 - best_ratio).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::FileSample;
    use std::collections::BTreeSet;

    fn paths(entries: &[&str]) -> BTreeSet<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    fn classify(
        paths: &BTreeSet<String>,
        manifest: Option<&str>,
        samples: &[FileSample],
    ) -> FrameworkDetection {
        let config = AnalysisConfig::default();
        let classifier = FrameworkClassifier::new(&config);
        classifier.classify(&ProjectEvidence {
            paths,
            manifest,
            samples,
        })
    }

    #[test]
    fn manifest_declaration_alone_clears_the_threshold() {
        let tree = paths(&["src", "src/index.php"]);
        let manifest = r#"{"require": {"laravel/framework": "^10.0"}}"#;
        let detection = classify(&tree, Some(manifest), &[]);
        assert_eq!(detection.kind, FrameworkKind::Laravel);
        let config = AnalysisConfig::default();
        assert!(detection.confidence >= config.threshold_for(FrameworkKind::Laravel, 0.30));
    }

    #[test]
    fn laravel_layout_beats_generic_signals() {
        let tree = paths(&[
            "app/http/controllers",
            "app/http/controllers/usercontroller.php",
            "routes",
            "routes/web.php",
            "database/migrations",
            "artisan",
            "config/app.php",
        ]);
        let samples = vec![FileSample {
            relative: "routes/web.php".into(),
            content: "<?php use Illuminate\\Support\\Facades\\Route; Route::get('/', fn() => 1);"
                .into(),
        }];
        let detection = classify(&tree, None, &samples);
        assert_eq!(detection.kind, FrameworkKind::Laravel);
    }

    #[test]
    fn custom_router_is_not_claimed_by_generic_frameworks() {
        let tree = paths(&[
            "controllers",
            "models",
            "views",
            "index.php",
            "controllers/home.php",
        ]);
        let samples = vec![FileSample {
            relative: "index.php".into(),
            content: "<?php $uri = $_SERVER['REQUEST_URI']; switch ($page) { default: break; }"
                .into(),
        }];
        let detection = classify(&tree, None, &samples);
        assert_eq!(detection.kind, FrameworkKind::CustomMvc);
    }

    #[test]
    fn custom_with_composer_requires_a_manifest() {
        let tree = paths(&["controllers", "models", "views", "index.php"]);
        let samples = vec![FileSample {
            relative: "index.php".into(),
            content: "<?php $uri = $_SERVER['REQUEST_URI'];".into(),
        }];
        let with = classify(&tree, Some(r#"{"require": {"monolog/monolog": "^3"}}"#), &samples);
        assert_eq!(with.kind, FrameworkKind::CustomWithComposer);

        let without = classify(&tree, None, &samples);
        assert_eq!(without.kind, FrameworkKind::CustomMvc);
    }

    #[test]
    fn declared_framework_shadows_custom_layout() {
        // Custom detectors run first but zero out on a declared framework.
        let tree = paths(&["controllers", "models", "views"]);
        let samples = vec![FileSample {
            relative: "index.php".into(),
            content: "<?php $uri = $_SERVER['REQUEST_URI']; switch ($page) {}".into(),
        }];
        let manifest = r#"{"require": {"slim/slim": "^4.0"}}"#;
        let detection = classify(&tree, Some(manifest), &samples);
        assert_eq!(detection.kind, FrameworkKind::Slim);
    }

    #[test]
    fn empty_tree_falls_back_to_vanilla() {
        let tree = paths(&["index.php"]);
        let detection = classify(&tree, None, &[]);
        assert_eq!(detection.kind, FrameworkKind::Vanilla);
        assert!((0.0..=1.0).contains(&detection.confidence));
    }

    #[test]
    fn classification_is_deterministic() {
        let tree = paths(&["app/http/controllers", "routes", "artisan"]);
        let first = classify(&tree, None, &[]);
        let second = classify(&tree, None, &[]);
        assert_eq!(first.kind, second.kind);
        assert!((first.confidence - second.confidence).abs() < f64::EPSILON);
    }
}
