// Export modules for library usage
pub mod analysis;
pub mod cli;
pub mod common;
pub mod config;
pub mod core;
pub mod database;
pub mod deps;
pub mod detect;
pub mod errors;
pub mod io;
pub mod parse;
pub mod routes;
pub mod structure;
pub mod validate;

// Re-export commonly used types
pub use crate::analysis::{analyze_project, ProjectAnalyzer};
pub use crate::config::AnalysisConfig;
pub use crate::core::{
    AnalysisWarning, ClassSymbol, DatabaseConnection, DatabaseDriver, DatabaseReport, Dependency,
    DependencyReport, DirectoryNode, DirectoryPurpose, Endpoint, FileSymbols, FrameworkDetection,
    FrameworkKind, FunctionSymbol, HttpMethod, MigrationComplexity, OrganizationPattern, OrmKind,
    ProjectModel, Provenance, QueryOccurrence, QueryStyle, ResponseFormat, StructureReport, Symbol,
    Table,
};
pub use crate::errors::{AnalysisError, Result};
pub use crate::validate::{check, ValidationReport};

pub use crate::detect::{FrameworkClassifier, FrameworkDetector};
pub use crate::parse::parse_symbols;
pub use crate::routes::RouteExtractor;
