pub mod model;

pub use model::{
    AnalysisWarning, ClassKind, ClassSymbol, ColumnHint, ConstantSymbol, DatabaseConnection,
    DatabaseDriver, DatabaseReport, Dependency, DependencyReport, DirectoryNode, DirectoryPurpose,
    Endpoint, FileSymbols, FrameworkDetection, FrameworkKind, FunctionSymbol, HttpMethod,
    MigrationComplexity, NamespaceSymbol, OrganizationPattern, OrmKind, ProjectModel,
    PropertySymbol, Provenance, QueryOccurrence, QueryStyle, ResponseFormat, StructureReport,
    Symbol, Table, UseSymbol, Visibility,
};
