//! Organization pattern and architecture scoring over the directory tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::purpose::{classify_purpose, framework_role};
use crate::core::{DirectoryNode, DirectoryPurpose, FrameworkKind, OrganizationPattern, StructureReport};

/// Build tagged directory nodes from the walked tree.
pub fn build_nodes(
    directories: &[PathBuf],
    files: &[PathBuf],
    framework: FrameworkKind,
) -> Vec<DirectoryNode> {
    directories
        .iter()
        .map(|dir| {
            let file_count = files
                .iter()
                .filter(|f| f.parent() == Some(dir.as_path()))
                .count();
            let subdir_count = directories
                .iter()
                .filter(|d| d.parent() == Some(dir.as_path()))
                .count();
            DirectoryNode {
                path: dir.clone(),
                file_count,
                subdir_count,
                purpose: classify_purpose(dir),
                framework_role: framework_role(dir, framework),
            }
        })
        .collect()
}

/// Front controllers at the root or under `public/`.
pub fn find_entry_points(files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|f| {
            let name = f
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if name != "index.php" {
                return false;
            }
            matches!(
                f.parent().map(Path::to_string_lossy).as_deref(),
                None | Some("") | Some("public") | Some("web") | Some("htdocs")
            )
        })
        .cloned()
        .collect()
}

fn purposes_of(nodes: &[DirectoryNode]) -> BTreeSet<DirectoryPurpose> {
    nodes.iter().filter_map(|n| n.purpose).collect()
}

/// Fixed decision order, most specific pattern first.
pub fn classify_organization(
    nodes: &[DirectoryNode],
    framework: FrameworkKind,
) -> OrganizationPattern {
    let purposes = purposes_of(nodes);
    let has = |p: DirectoryPurpose| purposes.contains(&p);

    if matches!(
        framework,
        FrameworkKind::CustomMvc | FrameworkKind::CustomWithComposer
    ) {
        return OrganizationPattern::CustomMvc;
    }
    let mvc_count = [
        DirectoryPurpose::Controller,
        DirectoryPurpose::Model,
        DirectoryPurpose::View,
    ]
    .iter()
    .filter(|p| has(**p))
    .count();
    if mvc_count == 3 {
        return OrganizationPattern::FullMvc;
    }
    if mvc_count == 2 {
        return OrganizationPattern::PartialMvc;
    }
    if has(DirectoryPurpose::Service) && has(DirectoryPurpose::Repository) {
        return OrganizationPattern::DomainDriven;
    }
    let layered_count = [
        DirectoryPurpose::Controller,
        DirectoryPurpose::Service,
        DirectoryPurpose::Repository,
        DirectoryPurpose::Model,
    ]
    .iter()
    .filter(|p| has(**p))
    .count();
    if layered_count >= 3 {
        return OrganizationPattern::Layered;
    }
    if purposes.len() >= 6 {
        return OrganizationPattern::ComponentBased;
    }
    let leaf_count = nodes.iter().filter(|n| n.subdir_count == 0).count();
    if !nodes.is_empty() && leaf_count * 10 >= nodes.len() * 7 {
        return OrganizationPattern::Flat;
    }
    OrganizationPattern::Mixed
}

fn pattern_base(pattern: OrganizationPattern) -> f64 {
    match pattern {
        OrganizationPattern::DomainDriven => 7.0,
        OrganizationPattern::FullMvc => 6.5,
        OrganizationPattern::Layered => 6.0,
        OrganizationPattern::CustomMvc => 5.5,
        OrganizationPattern::ComponentBased => 5.0,
        OrganizationPattern::PartialMvc => 4.0,
        OrganizationPattern::Mixed => 3.0,
        OrganizationPattern::Flat => 2.0,
    }
}

/// Bounded additive architecture score, clamped to [0, 10].
pub fn architecture_score(
    pattern: OrganizationPattern,
    framework: FrameworkKind,
    nodes: &[DirectoryNode],
    entry_point_count: usize,
) -> f64 {
    let mut score = pattern_base(pattern);

    if !framework.is_custom() {
        score += 1.5;
    } else if framework != FrameworkKind::Vanilla {
        score += 0.5;
    }

    let diversity = purposes_of(nodes).len();
    if diversity >= 5 {
        score += 1.0;
    } else if diversity >= 3 {
        score += 0.5;
    }

    score += match entry_point_count {
        1 => 0.5,
        2 | 3 => 0.0,
        _ => -0.5,
    };

    let config_dirs = nodes
        .iter()
        .filter(|n| n.purpose == Some(DirectoryPurpose::Config))
        .count();
    if config_dirs >= 1 {
        score += 0.5;
    }

    score.clamp(0.0, 10.0)
}

/// Assemble the full structure report.
pub fn classify(
    directories: &[PathBuf],
    files: &[PathBuf],
    framework: FrameworkKind,
) -> StructureReport {
    let nodes = build_nodes(directories, files, framework);
    let entry_points = find_entry_points(files);
    let pattern = classify_organization(&nodes, framework);
    let score = architecture_score(pattern, framework, &nodes, entry_points.len());
    StructureReport {
        directories: nodes,
        pattern,
        architecture_score: score,
        entry_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn full_mvc_requires_all_three_purposes() {
        let directories = dirs(&["app", "app/controllers", "app/models", "app/views", "config"]);
        let files = dirs(&["index.php"]);
        let report = classify(&directories, &files, FrameworkKind::Laravel);
        assert_eq!(report.pattern, OrganizationPattern::FullMvc);
    }

    #[test]
    fn two_of_three_is_partial_mvc() {
        let directories = dirs(&["controllers", "views"]);
        let report = classify(&directories, &[], FrameworkKind::Vanilla);
        assert_eq!(report.pattern, OrganizationPattern::PartialMvc);
    }

    #[test]
    fn custom_framework_forces_custom_mvc_pattern() {
        let directories = dirs(&["controllers", "models", "views"]);
        let report = classify(&directories, &[], FrameworkKind::CustomMvc);
        assert_eq!(report.pattern, OrganizationPattern::CustomMvc);
    }

    #[test]
    fn services_plus_repositories_is_domain_driven() {
        let directories = dirs(&["src", "src/services", "src/repositories"]);
        let report = classify(&directories, &[], FrameworkKind::Vanilla);
        assert_eq!(report.pattern, OrganizationPattern::DomainDriven);
    }

    #[test]
    fn flat_trees_are_recognized() {
        let directories = dirs(&["a", "b", "c"]);
        let report = classify(&directories, &[], FrameworkKind::Vanilla);
        assert_eq!(report.pattern, OrganizationPattern::Flat);
    }

    #[test]
    fn entry_points_are_found_at_root_and_public() {
        let files = dirs(&["index.php", "public/index.php", "app/index.php", "other.php"]);
        let entries = find_entry_points(&files);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn architecture_score_stays_in_bounds() {
        let directories = dirs(&[
            "app/controllers",
            "app/models",
            "app/views",
            "config",
            "routes",
            "tests",
            "public",
        ]);
        let files = dirs(&["public/index.php"]);
        let report = classify(&directories, &files, FrameworkKind::Laravel);
        assert!(report.architecture_score <= 10.0);
        assert!(report.architecture_score >= 0.0);
        // Known framework, full MVC, diverse purposes, one entry point.
        assert!(report.architecture_score >= 9.0);
    }

    #[test]
    fn directory_counts_are_computed() {
        let directories = dirs(&["app", "app/models"]);
        let files = dirs(&["app/helpers.php", "app/models/User.php"]);
        let nodes = build_nodes(&directories, &files, FrameworkKind::Laravel);
        let app = nodes.iter().find(|n| n.path == PathBuf::from("app")).unwrap();
        assert_eq!(app.file_count, 1);
        assert_eq!(app.subdir_count, 1);
    }
}
