//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "migramap")]
#[command(about = "Static analyzer that maps PHP web applications for migration planning", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a source tree and emit the project model as JSON
    Analyze {
        /// Path to the project root
        path: PathBuf,

        /// Configuration file (migramap.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze, then report pass/fail with suggestions
    Validate {
        /// Path to the project root
        path: PathBuf,

        /// Configuration file (migramap.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
