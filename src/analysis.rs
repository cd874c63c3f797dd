//! The analysis pipeline.
//!
//! Phase 1 walks the tree and reads the manifest. Phase 2 classifies the
//! framework from tree metadata and a capped content sample. Phase 3 runs the
//! per-file analyses (symbols, endpoints, query scan) on a bounded worker
//! pool; no file's analysis touches another file's state, so results merge at
//! a single barrier in traversal order. Phase 4 runs the tree-level analyses
//! and phase 5 assembles the immutable [`ProjectModel`] with no further
//! inference.

use chrono::Utc;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::core::{
    AnalysisWarning, DatabaseReport, DependencyReport, Endpoint, FileSymbols, FrameworkDetection,
    ProjectModel, Provenance, QueryOccurrence, StructureReport,
};
use crate::database::{self, ConfigFileKind, MigrationColumn, ModelHit, OrmSignals, TableCatalog};
use crate::deps;
use crate::detect::{FileSample, FrameworkClassifier, ProjectEvidence};
use crate::errors::{AnalysisError, Result};
use crate::io::{read_text, SourceWalker, WalkedFile};
use crate::parse;
use crate::routes::RouteExtractor;
use crate::structure;

/// Files sampled for framework content patterns.
const SAMPLE_FILE_CAP: usize = 16;

/// Run a full analysis with `config` over the tree rooted at `root`.
pub fn analyze_project(root: &Path, config: &AnalysisConfig) -> Result<ProjectModel> {
    ProjectAnalyzer::new(config).analyze(root)
}

pub struct ProjectAnalyzer<'cfg> {
    config: &'cfg AnalysisConfig,
}

/// Everything one file contributes, merged after the parallel phase.
#[derive(Default)]
struct FileAnalysis {
    symbols: Option<FileSymbols>,
    endpoints: Vec<Endpoint>,
    queries: Vec<QueryOccurrence>,
    orm: OrmSignals,
    models: Vec<ModelHit>,
    migration_columns: Vec<MigrationColumn>,
    connections: Vec<crate::core::DatabaseConnection>,
    warnings: Vec<AnalysisWarning>,
}

impl<'cfg> ProjectAnalyzer<'cfg> {
    pub fn new(config: &'cfg AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, root: &Path) -> Result<ProjectModel> {
        self.config.validate()?;
        let walk = SourceWalker::new(root, self.config).walk()?;
        if walk.source_files.is_empty() {
            return Err(AnalysisError::EmptyProject(root.to_path_buf()));
        }
        log::info!(
            "analyzing {} source files under {}",
            walk.source_files.len(),
            root.display()
        );

        let mut warnings: Vec<AnalysisWarning> = Vec::new();

        let manifest_text = self.read_special(&walk.special_files, "composer.json", &mut warnings);
        if manifest_text.is_none() {
            warnings.push(AnalysisWarning::global(
                AnalysisError::MissingManifest(root.to_path_buf()).to_string(),
            ));
        }

        let framework = self.classify_framework(&walk, manifest_text.as_deref());
        log::info!(
            "framework: {} (confidence {:.2})",
            framework.kind,
            framework.confidence
        );

        let analyses = self.run_file_phase(&walk.source_files, framework);

        // Barrier: merge per-file results in traversal order.
        let mut files = Vec::new();
        let mut endpoints = Vec::new();
        let mut queries = Vec::new();
        let mut orm = OrmSignals::default();
        let mut catalog = TableCatalog::new();
        let mut connections = Vec::new();
        for analysis in analyses {
            let file_path = analysis.symbols.as_ref().map(|s| s.path.clone());
            if let Some(symbols) = analysis.symbols {
                files.push(symbols);
            }
            endpoints.extend(analysis.endpoints);
            for occurrence in &analysis.queries {
                catalog.record_query(occurrence);
            }
            queries.extend(analysis.queries);
            orm.merge(analysis.orm);
            if let Some(path) = &file_path {
                for hit in &analysis.models {
                    catalog.record_model(hit, path);
                }
                for column in &analysis.migration_columns {
                    catalog.record_migration_column(column, path);
                }
            }
            connections.extend(analysis.connections);
            warnings.extend(analysis.warnings);
        }

        // Tree-level phase: .env connections, dependencies, structure.
        let env_text = self
            .read_special(&walk.special_files, ".env", &mut warnings)
            .or_else(|| self.read_special(&walk.special_files, ".env.local", &mut warnings));
        if let Some(env_text) = env_text {
            connections.extend(database::analyze_config_file(ConfigFileKind::Env, &env_text));
        }

        let dependencies = match &manifest_text {
            Some(text) => match deps::ComposerManifest::parse(text) {
                Ok(manifest) => deps::resolve(&manifest),
                Err(err) => {
                    warnings.push(AnalysisWarning::global(err.to_string()));
                    DependencyReport::default()
                }
            },
            None => DependencyReport::default(),
        };

        let all_files: Vec<PathBuf> = walk
            .source_files
            .iter()
            .chain(walk.special_files.iter())
            .map(|f| f.relative.clone())
            .chain(walk.other_files.iter().cloned())
            .collect();
        let structure = structure::classify(&walk.directories, &all_files, framework.kind);

        let database = DatabaseReport {
            connections,
            orm: orm.label(),
            queries,
            tables: catalog.into_tables(),
        };

        let provenance = Provenance {
            analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            files_scanned: walk.source_files.len(),
            files_skipped: walk.skipped,
            warnings,
        };

        Ok(aggregate(
            root.to_path_buf(),
            framework,
            files,
            endpoints,
            database,
            dependencies,
            structure,
            provenance,
        ))
    }

    fn read_special(
        &self,
        special: &[WalkedFile],
        name: &str,
        warnings: &mut Vec<AnalysisWarning>,
    ) -> Option<String> {
        // Root-most wins when nested packages carry their own copy.
        let file = special
            .iter()
            .filter(|f| {
                f.relative
                    .file_name()
                    .map(|n| n.to_string_lossy() == name)
                    .unwrap_or(false)
            })
            .min_by_key(|f| f.relative.components().count())?;
        match read_text(&file.path) {
            Ok(text) => Some(text),
            Err(err) => {
                warnings.push(AnalysisWarning::for_file(&file.relative, err.to_string()));
                None
            }
        }
    }

    fn classify_framework(
        &self,
        walk: &crate::io::WalkOutcome,
        manifest: Option<&str>,
    ) -> FrameworkDetection {
        let paths: BTreeSet<String> = walk
            .directories
            .iter()
            .chain(walk.source_files.iter().map(|f| &f.relative))
            .chain(walk.special_files.iter().map(|f| &f.relative))
            .chain(walk.other_files.iter())
            .map(|p| p.to_string_lossy().replace('\\', "/").to_lowercase())
            .collect();

        let samples: Vec<FileSample> = walk
            .source_files
            .iter()
            .take(SAMPLE_FILE_CAP)
            .filter_map(|f| {
                read_text(&f.path).ok().map(|content| FileSample {
                    relative: f.relative.to_string_lossy().to_lowercase(),
                    content,
                })
            })
            .collect();

        FrameworkClassifier::new(self.config).classify(&ProjectEvidence {
            paths: &paths,
            manifest,
            samples: &samples,
        })
    }

    /// Per-file analyses on a worker pool sized to the machine, capped by the
    /// scan budget. Results come back in input (traversal) order.
    fn run_file_phase(
        &self,
        source_files: &[WalkedFile],
        framework: FrameworkDetection,
    ) -> Vec<FileAnalysis> {
        let extractor = RouteExtractor::new(framework.kind);
        let workers = num_cpus::get().min(source_files.len()).max(1);
        let work = || {
            source_files
                .par_iter()
                .map(|file| analyze_file(file, &extractor))
                .collect::<Vec<_>>()
        };
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(work),
            Err(err) => {
                log::warn!("worker pool unavailable ({err}); using the global pool");
                work()
            }
        }
    }
}

fn analyze_file(file: &WalkedFile, extractor: &RouteExtractor) -> FileAnalysis {
    let mut analysis = FileAnalysis::default();
    let text = match read_text(&file.path) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{err}");
            analysis
                .warnings
                .push(AnalysisWarning::for_file(&file.relative, err.to_string()));
            analysis.symbols = Some(FileSymbols {
                path: file.relative.clone(),
                symbols: Vec::new(),
                partial: true,
            });
            return analysis;
        }
    };

    let (symbols, parse_warnings) = parse::parse_symbols(&file.relative, &text);
    analysis.warnings.extend(parse_warnings);
    analysis.endpoints = extractor.extract(&file.relative, &text);
    let (queries, orm) = database::scan_queries(&file.relative, &text);
    analysis.queries = queries;
    analysis.orm = orm;
    analysis.models = database::scan_models(&symbols, &text);
    if file
        .relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().eq_ignore_ascii_case("migrations"))
    {
        analysis.migration_columns = database::scan_migration(&file.relative, &text);
    }
    if database::config_file_kind(&file.relative) == Some(ConfigFileKind::PhpConfig) {
        analysis.connections = database::analyze_config_file(ConfigFileKind::PhpConfig, &text);
    }
    analysis.symbols = Some(symbols);
    analysis
}

/// Pure assembly of the independent analysis outputs into one immutable
/// model. No new inference, no file reads; inconsistencies between signals
/// are preserved as-is for the planning stage.
#[allow(clippy::too_many_arguments)]
fn aggregate(
    root: PathBuf,
    framework: FrameworkDetection,
    files: Vec<FileSymbols>,
    endpoints: Vec<Endpoint>,
    database: DatabaseReport,
    dependencies: DependencyReport,
    structure: StructureReport,
    provenance: Provenance,
) -> ProjectModel {
    ProjectModel {
        root,
        framework,
        files,
        endpoints,
        database,
        dependencies,
        structure,
        provenance,
    }
}
