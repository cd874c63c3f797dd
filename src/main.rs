use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use migramap::cli::{Cli, Commands};
use migramap::config::AnalysisConfig;
use migramap::{analyze_project, validate};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            config,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let model = analyze_project(&path, &config)?;
            write_json(&model, output.as_deref())?;
        }
        Commands::Validate { path, config } => {
            let config = load_config(config.as_deref())?;
            let model = analyze_project(&path, &config)?;
            let report = validate::check(&model, &config);
            write_json(&report, None)?;
            if !report.passed {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => {
            let default_path = PathBuf::from("migramap.toml");
            if default_path.exists() {
                AnalysisConfig::load(&default_path).context("loading migramap.toml")
            } else {
                Ok(AnalysisConfig::default())
            }
        }
    }
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, value)?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}
