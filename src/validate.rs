//! Validation-only entry point.
//!
//! Reports pass/fail with structured reasons and human-readable suggestions
//! derived from the model, never a stack trace.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::core::{MigrationComplexity, ProjectModel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    /// Conditions that fail validation outright.
    pub reasons: Vec<String>,
    /// Non-fatal advice for the planning stage.
    pub suggestions: Vec<String>,
}

/// Inspect a finished model against the run configuration.
pub fn check(model: &ProjectModel, config: &AnalysisConfig) -> ValidationReport {
    let mut reasons = Vec::new();
    let mut suggestions = Vec::new();

    if model.endpoints.is_empty() {
        reasons.push("no HTTP endpoints detected".to_string());
        suggestions.push(format!(
            "no endpoints detected for framework {}; check that routing files are inside the scan \
             roots and not excluded by ignored_path_globs",
            model.framework.kind
        ));
    }

    if let Some(&threshold) = config
        .framework_score_thresholds
        .get(&model.framework.kind)
    {
        if model.framework.confidence < threshold {
            reasons.push(format!(
                "framework confidence {:.2} is below the configured threshold {:.2} for {}",
                model.framework.confidence, threshold, model.framework.kind
            ));
        }
    }

    if model.database.connections.is_empty() && !model.database.tables.is_empty() {
        suggestions.push(format!(
            "{} tables are referenced but no connection configuration was found; database settings \
             may live outside the scanned tree",
            model.database.tables.len()
        ));
    }

    let unmapped = model
        .dependencies
        .dependencies
        .iter()
        .filter(|d| !d.is_platform && !d.is_framework && d.mapped_to.is_none())
        .count();
    if unmapped > 0 {
        suggestions.push(format!(
            "{unmapped} dependencies have no known target-ecosystem equivalent and will need \
             manual porting"
        ));
    }

    if model.dependencies.complexity_tier == Some(MigrationComplexity::High) {
        suggestions.push(
            "dependency complexity is high; consider migrating in phases, framework first"
                .to_string(),
        );
    }

    let untagged = model
        .structure
        .directories
        .iter()
        .filter(|d| d.purpose.is_none())
        .count();
    if untagged * 2 > model.structure.directories.len() && !model.structure.directories.is_empty() {
        suggestions.push(
            "most directories carry no recognizable purpose; expect manual review of the layout"
                .to_string(),
        );
    }

    ValidationReport {
        passed: reasons.is_empty(),
        reasons,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use chrono::Utc;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn empty_model() -> ProjectModel {
        ProjectModel {
            root: PathBuf::from("/tmp/app"),
            framework: FrameworkDetection {
                kind: FrameworkKind::Vanilla,
                confidence: 0.8,
            },
            files: Vec::new(),
            endpoints: Vec::new(),
            database: DatabaseReport::default(),
            dependencies: DependencyReport::default(),
            structure: StructureReport {
                directories: Vec::new(),
                pattern: OrganizationPattern::Flat,
                architecture_score: 2.0,
                entry_points: Vec::new(),
            },
            provenance: Provenance {
                analyzer_version: "test".into(),
                generated_at: Utc::now(),
                files_scanned: 1,
                files_skipped: 0,
                warnings: Vec::new(),
            },
        }
    }

    fn an_endpoint() -> Endpoint {
        Endpoint {
            method: HttpMethod::Get,
            route: "/".into(),
            handler: "{closure}".into(),
            file: PathBuf::from("index.php"),
            line: 1,
            parameters: Vec::new(),
            middleware: BTreeSet::new(),
            auth: None,
            response_format: ResponseFormat::Unknown,
        }
    }

    #[test]
    fn missing_endpoints_fail_validation() {
        let report = check(&empty_model(), &AnalysisConfig::default());
        assert!(!report.passed);
        assert!(report.reasons[0].contains("no HTTP endpoints"));
    }

    #[test]
    fn confident_model_with_endpoints_passes() {
        let mut model = empty_model();
        model.endpoints.push(an_endpoint());
        let report = check(&model, &AnalysisConfig::default());
        assert!(report.passed);
    }

    #[test]
    fn low_confidence_against_configured_threshold_fails() {
        let mut model = empty_model();
        model.endpoints.push(an_endpoint());
        model.framework.confidence = 0.2;
        let mut config = AnalysisConfig::default();
        config
            .framework_score_thresholds
            .insert(FrameworkKind::Vanilla, 0.5);
        let report = check(&model, &config);
        assert!(!report.passed);
        assert!(report.reasons[0].contains("below the configured threshold"));
    }

    #[test]
    fn unmapped_dependencies_only_suggest() {
        let mut model = empty_model();
        model.endpoints.push(an_endpoint());
        model.dependencies.dependencies.push(Dependency {
            package: "acme/widgets".into(),
            constraint: "^1.0".into(),
            mapped_to: None,
            complexity: MigrationComplexity::Medium,
            is_framework: false,
            is_dev: false,
            is_platform: false,
        });
        let report = check(&model, &AnalysisConfig::default());
        assert!(report.passed);
        assert!(report.suggestions.iter().any(|s| s.contains("manual porting")));
    }
}
