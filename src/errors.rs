//! Error taxonomy for analysis runs.
//!
//! Almost every failure is recorded as a warning on the model's provenance
//! and the run continues; `EmptyProject` is the only condition that fails a
//! whole run, since every other signal depends on having at least one
//! eligible source file.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Permission or encoding failure on one file. The file is skipped.
    #[error("unreadable file {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Brace/quote mismatch. Symbol extraction for that file is partial.
    #[error("malformed syntax in {}: {detail}", path.display())]
    MalformedSyntax { path: PathBuf, detail: String },

    /// No composer.json found. The dependency report is empty, not failing.
    #[error("no package manifest found under {}", .0.display())]
    MissingManifest(PathBuf),

    /// No eligible source files at all. The only whole-run failure.
    #[error("no eligible source files found under {}", .0.display())]
    EmptyProject(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
