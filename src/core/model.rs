//! Data model for an analyzed project.
//!
//! Everything here is plain value data with stable serde field names. The
//! aggregate root is [`ProjectModel`]: built exactly once per analysis run,
//! never mutated afterwards, and consumed read-only by the planning and
//! generation stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Closed set of recognized web frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameworkKind {
    Laravel,
    Symfony,
    #[serde(rename = "codeigniter")]
    CodeIgniter,
    Slim,
    CustomMvc,
    CustomWithComposer,
    Vanilla,
}

impl FrameworkKind {
    pub fn label(&self) -> &'static str {
        match self {
            FrameworkKind::Laravel => "laravel",
            FrameworkKind::Symfony => "symfony",
            FrameworkKind::CodeIgniter => "codeigniter",
            FrameworkKind::Slim => "slim",
            FrameworkKind::CustomMvc => "custom-mvc",
            FrameworkKind::CustomWithComposer => "custom-with-composer",
            FrameworkKind::Vanilla => "vanilla",
        }
    }

    /// True for hand-rolled projects without a recognized framework package.
    pub fn is_custom(&self) -> bool {
        matches!(
            self,
            FrameworkKind::CustomMvc | FrameworkKind::CustomWithComposer | FrameworkKind::Vanilla
        )
    }
}

impl fmt::Display for FrameworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One framework label plus the match confidence that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameworkDetection {
    pub kind: FrameworkKind,
    /// Always in [0, 1].
    pub confidence: f64,
}

/// HTTP methods recognized in route declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Any,
}

impl HttpMethod {
    /// Parse a method keyword as it appears in routing DSLs. Unrecognized
    /// verbs map to `Any` so a route is never dropped over its method.
    pub fn from_keyword(word: &str) -> HttpMethod {
        match word.to_ascii_lowercase().as_str() {
            "get" => HttpMethod::Get,
            "post" => HttpMethod::Post,
            "put" => HttpMethod::Put,
            "delete" => HttpMethod::Delete,
            "patch" => HttpMethod::Patch,
            _ => HttpMethod::Any,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response format declared or implied by a handler's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
    Html,
    Unknown,
}

/// One declared HTTP endpoint.
///
/// Route parameters use the canonical `{name}` delimiter regardless of the
/// source idiom they were declared with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub route: String,
    /// Handler reference, `Controller.action` or `{closure}`.
    pub handler: String,
    pub file: PathBuf,
    /// 1-based line of the declaration.
    pub line: usize,
    /// Ordered path parameter names.
    pub parameters: Vec<String>,
    /// Middleware tags. Insertion order is irrelevant.
    pub middleware: BTreeSet<String>,
    /// Authentication requirement, when a guard middleware was found.
    pub auth: Option<String>,
    pub response_format: ResponseFormat,
}

/// Visibility modifier on class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Class-like declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSymbol {
    pub name: String,
    pub line: usize,
}

/// An import (`use`) statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseSymbol {
    pub target: String,
    pub alias: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantSymbol {
    pub name: String,
    pub value: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySymbol {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub line: usize,
}

/// A named function or method.
///
/// Invariant: `name` is non-empty and `parameters` holds ordered parameter
/// names only, with type hints and default values stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    pub parameters: Vec<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub line: usize,
    pub doc: Option<String>,
}

/// A class, interface, or trait with its owned members.
///
/// `extends` and `implements` are references by name only; they are never
/// resolved to other `ClassSymbol`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    pub kind: ClassKind,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub trait_uses: Vec<String>,
    pub constants: Vec<ConstantSymbol>,
    pub properties: Vec<PropertySymbol>,
    pub methods: Vec<FunctionSymbol>,
    pub line: usize,
    pub doc: Option<String>,
}

/// One declared symbol in a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Symbol {
    Namespace(NamespaceSymbol),
    Use(UseSymbol),
    Class(ClassSymbol),
    Function(FunctionSymbol),
    Constant(ConstantSymbol),
}

/// The symbol table extracted from one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSymbols {
    pub path: PathBuf,
    pub symbols: Vec<Symbol>,
    /// True when extraction recovered from malformed input and the symbol
    /// list is known to be partial.
    pub partial: bool,
}

/// Database driver families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "postgresql")]
    PostgreSql,
    Sqlite,
    #[serde(rename = "mongodb")]
    MongoDb,
    Unknown,
}

/// One detected database connection. Multiple may coexist per project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConnection {
    /// Logical connection name, `default` when the source declares none.
    pub name: String,
    pub driver: DatabaseDriver,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub charset: Option<String>,
}

/// ORM layers recognized in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrmKind {
    Eloquent,
    Doctrine,
    #[serde(rename = "codeigniter-builder")]
    CodeIgniterBuilder,
}

/// How a query occurrence reaches the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryStyle {
    RawSql,
    Prepared,
    Orm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOccurrence {
    pub file: PathBuf,
    pub line: usize,
    pub style: QueryStyle,
    pub table: Option<String>,
}

/// Best-guess column descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHint {
    pub name: String,
    pub data_type: Option<String>,
}

/// An inferred database table.
///
/// `name` is canonical lowercase and is the deduplication key: a table first
/// seen via a query and later via a model declaration is one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnHint>,
    /// Free-text relationship descriptors, one-way only.
    pub relationships: Vec<String>,
    pub model_class: Option<String>,
    pub referenced_by: BTreeSet<PathBuf>,
}

/// Everything the database analyzer produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseReport {
    pub connections: Vec<DatabaseConnection>,
    pub orm: Option<OrmKind>,
    pub queries: Vec<QueryOccurrence>,
    pub tables: Vec<Table>,
}

/// Migration complexity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationComplexity {
    Low,
    Medium,
    High,
}

/// One declared manifest dependency.
///
/// `mapped_to` absent means the package has no known target-ecosystem
/// equivalent; the entry is still present, never dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub package: String,
    pub constraint: String,
    pub mapped_to: Option<String>,
    pub complexity: MigrationComplexity,
    pub is_framework: bool,
    pub is_dev: bool,
    /// Platform requirement (`php` itself, `ext-*`).
    pub is_platform: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyReport {
    pub dependencies: Vec<Dependency>,
    /// Framework-class packages, tracked separately from ordinary libraries.
    pub framework_packages: Vec<String>,
    /// Weighted project score, clamped to [0, 100].
    pub complexity_score: f64,
    pub complexity_tier: Option<MigrationComplexity>,
}

/// Closed set of inferred directory purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryPurpose {
    Controller,
    Model,
    View,
    Config,
    Routes,
    Migration,
    Middleware,
    Service,
    Repository,
    Test,
    Asset,
    Storage,
    Helper,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Path relative to the project root.
    pub path: PathBuf,
    pub file_count: usize,
    pub subdir_count: usize,
    pub purpose: Option<DirectoryPurpose>,
    /// Role within the detected framework, e.g. `http layer`.
    pub framework_role: Option<String>,
}

/// Organization pattern labels, decided in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizationPattern {
    CustomMvc,
    FullMvc,
    PartialMvc,
    DomainDriven,
    Layered,
    ComponentBased,
    Flat,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub directories: Vec<DirectoryNode>,
    pub pattern: OrganizationPattern,
    /// Bounded additive score, clamped to [0, 10].
    pub architecture_score: f64,
    /// Front controllers found at the root or under `public/`.
    pub entry_points: Vec<PathBuf>,
}

/// A per-file or per-signal failure that did not abort the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl AnalysisWarning {
    pub fn for_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    pub fn global(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }
}

/// Run metadata attached to every model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub analyzer_version: String,
    pub generated_at: DateTime<Utc>,
    pub files_scanned: usize,
    /// Files skipped for size, budget, or read failures.
    pub files_skipped: usize,
    pub warnings: Vec<AnalysisWarning>,
}

/// The aggregate analysis result for one source tree.
///
/// Owns all sub-reports as value collections; nothing in here is shared or
/// cyclic. Disagreements between independently computed signals (say, a
/// `vanilla` framework label next to a custom-MVC directory layout) are
/// preserved as-is for the planning stage to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    pub root: PathBuf,
    pub framework: FrameworkDetection,
    pub files: Vec<FileSymbols>,
    pub endpoints: Vec<Endpoint>,
    pub database: DatabaseReport,
    pub dependencies: DependencyReport,
    pub structure: StructureReport,
    pub provenance: Provenance,
}
