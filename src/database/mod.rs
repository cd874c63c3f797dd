//! Database usage analysis: connections, query occurrences, ORM label, and
//! the inferred table catalog.

pub mod connections;
pub mod models;
pub mod queries;
pub mod tables;

pub use connections::{analyze_config_file, config_file_kind, ConfigFileKind};
pub use models::{scan_migration, scan_models, MigrationColumn, ModelHit};
pub use queries::{scan_queries, OrmSignals};
pub use tables::TableCatalog;
