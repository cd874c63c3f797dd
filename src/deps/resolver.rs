//! Dependency resolution and project complexity scoring.

use super::manifest::ComposerManifest;
use super::mapping;
use crate::core::{Dependency, DependencyReport, MigrationComplexity};

/// Capped contribution of sheer dependency count to the project score.
const COUNT_CAP: usize = 20;
const COUNT_WEIGHT: f64 = 1.0;
const UNMAPPED_WEIGHT: f64 = 3.0;
/// Fixed penalty per detected framework dependency.
const FRAMEWORK_PENALTY: f64 = 25.0;
const SCORE_MAX: f64 = 100.0;

fn complexity_weight(complexity: MigrationComplexity) -> f64 {
    match complexity {
        MigrationComplexity::Low => 1.0,
        MigrationComplexity::Medium => 3.0,
        MigrationComplexity::High => 6.0,
    }
}

fn bucket(score: f64) -> MigrationComplexity {
    if score < 35.0 {
        MigrationComplexity::Low
    } else if score < 70.0 {
        MigrationComplexity::Medium
    } else {
        MigrationComplexity::High
    }
}

/// Resolve every declared dependency. Total: no entry is ever dropped, so
/// `mapped + unmapped == declared` always holds.
pub fn resolve(manifest: &ComposerManifest) -> DependencyReport {
    let mut dependencies = Vec::with_capacity(manifest.declared_count());
    let mut framework_packages = Vec::new();

    let sections = [(&manifest.require, false), (&manifest.require_dev, true)];
    for (section, is_dev) in sections {
        for (package, constraint) in section.iter() {
            let is_platform = mapping::is_platform_package(package);
            let is_framework = mapping::is_framework_package(package);
            let mapped = if is_platform || is_framework {
                None
            } else {
                mapping::lookup(package)
            };

            let complexity = if is_framework {
                MigrationComplexity::High
            } else if is_platform {
                MigrationComplexity::Low
            } else {
                mapped
                    .map(|(_, complexity)| complexity)
                    .unwrap_or(MigrationComplexity::Medium)
            };

            if is_framework {
                framework_packages.push(package.clone());
            }
            dependencies.push(Dependency {
                package: package.clone(),
                constraint: constraint.clone(),
                mapped_to: mapped.map(|(target, _)| target.to_string()),
                complexity,
                is_framework,
                is_dev,
                is_platform,
            });
        }
    }

    let library_deps: Vec<&Dependency> = dependencies
        .iter()
        .filter(|d| !d.is_platform && !d.is_framework)
        .collect();
    let unmapped = library_deps.iter().filter(|d| d.mapped_to.is_none()).count();
    let weight_sum: f64 = library_deps
        .iter()
        .map(|d| complexity_weight(d.complexity))
        .sum();

    let score = (library_deps.len().min(COUNT_CAP) as f64 * COUNT_WEIGHT
        + unmapped as f64 * UNMAPPED_WEIGHT
        + weight_sum
        + framework_packages.len() as f64 * FRAMEWORK_PENALTY)
        .clamp(0.0, SCORE_MAX);

    let complexity_tier = if dependencies.is_empty() {
        None
    } else {
        Some(bucket(score))
    };

    DependencyReport {
        dependencies,
        framework_packages,
        complexity_score: score,
        complexity_tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> ComposerManifest {
        ComposerManifest::parse(json).unwrap()
    }

    #[test]
    fn resolution_is_total_over_the_manifest() {
        let report = resolve(&manifest(
            r#"{
                "require": {
                    "php": ">=8.1",
                    "laravel/framework": "^10.0",
                    "guzzlehttp/guzzle": "^7.2",
                    "acme/internal-sdk": "dev-main"
                },
                "require-dev": {"phpunit/phpunit": "^10.0"}
            }"#,
        ));
        assert_eq!(report.dependencies.len(), 5);
        let mapped = report
            .dependencies
            .iter()
            .filter(|d| d.mapped_to.is_some())
            .count();
        let unmapped = report
            .dependencies
            .iter()
            .filter(|d| d.mapped_to.is_none())
            .count();
        assert_eq!(mapped + unmapped, 5);
    }

    #[test]
    fn framework_dependency_is_tracked_separately_and_penalized() {
        let with = resolve(&manifest(r#"{"require": {"laravel/framework": "^10.0"}}"#));
        assert_eq!(with.framework_packages, vec!["laravel/framework"]);
        let without = resolve(&manifest(r#"{"require": {"monolog/monolog": "^3.0"}}"#));
        assert!(with.complexity_score > without.complexity_score + 20.0);
    }

    #[test]
    fn unknown_packages_stay_unmapped_with_medium_complexity() {
        let report = resolve(&manifest(r#"{"require": {"acme/widgets": "^1.0"}}"#));
        let dep = &report.dependencies[0];
        assert!(dep.mapped_to.is_none());
        assert_eq!(dep.complexity, MigrationComplexity::Medium);
    }

    #[test]
    fn platform_entries_are_kept_but_not_scored_as_libraries() {
        let report = resolve(&manifest(r#"{"require": {"php": ">=8.1", "ext-gd": "*"}}"#));
        assert_eq!(report.dependencies.len(), 2);
        assert!(report.dependencies.iter().all(|d| d.is_platform));
        assert_eq!(report.complexity_score, 0.0);
        assert_eq!(report.complexity_tier, Some(MigrationComplexity::Low));
    }

    #[test]
    fn score_is_clamped_and_bucketed() {
        // Three frameworks would exceed the cap without clamping.
        let report = resolve(&manifest(
            r#"{"require": {
                "laravel/framework": "*",
                "symfony/symfony": "*",
                "slim/slim": "*",
                "doctrine/orm": "*"
            }}"#,
        ));
        assert!(report.complexity_score <= 100.0);
        assert_eq!(report.complexity_tier, Some(MigrationComplexity::High));
    }

    #[test]
    fn empty_manifest_has_no_tier() {
        let report = resolve(&ComposerManifest::default());
        assert!(report.dependencies.is_empty());
        assert_eq!(report.complexity_tier, None);
        assert_eq!(report.complexity_score, 0.0);
    }

    #[test]
    fn dev_dependencies_are_flagged() {
        let report = resolve(&manifest(r#"{"require-dev": {"phpunit/phpunit": "^10"}}"#));
        assert!(report.dependencies[0].is_dev);
    }
}
