//! File-system traversal with ignore patterns, size caps, and a scan budget.

use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, Result};

/// Files that are read even though their suffix is not a source extension.
const SPECIAL_FILES: &[&str] = &["composer.json", "composer.lock", ".env", ".env.local"];

#[derive(Debug, Clone)]
pub struct WalkedFile {
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub relative: PathBuf,
    pub size: u64,
}

#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Files eligible for structural parsing, in traversal order, capped by
    /// the scan budget.
    pub source_files: Vec<WalkedFile>,
    /// Manifest and environment files picked up by name.
    pub special_files: Vec<WalkedFile>,
    /// Remaining files, kept as paths only. Framework marker files such as
    /// `artisan` have no source extension but still count as evidence.
    pub other_files: Vec<PathBuf>,
    /// All directories, relative to the root.
    pub directories: Vec<PathBuf>,
    /// Files skipped for size or budget reasons.
    pub skipped: usize,
}

pub struct SourceWalker<'a> {
    root: &'a Path,
    config: &'a AnalysisConfig,
    ignore_globs: Vec<glob::Pattern>,
}

impl<'a> SourceWalker<'a> {
    pub fn new(root: &'a Path, config: &'a AnalysisConfig) -> Self {
        let ignore_globs = config
            .ignored_path_globs
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();
        Self {
            root,
            config,
            ignore_globs,
        }
    }

    pub fn walk(&self) -> Result<WalkOutcome> {
        let mut outcome = WalkOutcome::default();
        // .gitignore is not honored: analyzed trees routinely gitignore the
        // .env file the database analyzer needs. Exclusions come from
        // `ignored_path_globs` only.
        let walker = WalkBuilder::new(self.root)
            .hidden(false)
            .git_ignore(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    log::warn!("walk error under {}: {err}", self.root.display());
                    continue;
                }
            };
            let path = entry.path();
            if path == self.root {
                continue;
            }
            let relative = path.strip_prefix(self.root).unwrap_or(path).to_path_buf();
            if self.is_ignored(&relative) {
                continue;
            }

            if path.is_dir() {
                outcome.directories.push(relative);
                continue;
            }
            if !path.is_file() {
                continue;
            }

            let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            let file = WalkedFile {
                path: path.to_path_buf(),
                relative,
                size,
            };

            if self.is_special(&file.relative) {
                outcome.special_files.push(file);
                continue;
            }
            if !self.is_source(&file.relative) {
                outcome.other_files.push(file.relative);
                continue;
            }
            if size > self.config.max_file_size_bytes {
                log::debug!(
                    "skipping oversize file {} ({size} bytes)",
                    file.relative.display()
                );
                outcome.skipped += 1;
                continue;
            }
            // Budget check between files; in-flight work is never interrupted.
            if outcome.source_files.len() >= self.config.max_files_to_scan {
                outcome.skipped += 1;
                continue;
            }
            outcome.source_files.push(file);
        }

        Ok(outcome)
    }

    fn is_ignored(&self, relative: &Path) -> bool {
        let path_str = relative.to_string_lossy();
        self.ignore_globs.iter().any(|p| p.matches(&path_str))
    }

    fn is_source(&self, relative: &Path) -> bool {
        relative
            .extension()
            .map(|ext| self.config.is_source_extension(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    fn is_special(&self, relative: &Path) -> bool {
        relative
            .file_name()
            .map(|name| {
                let name = name.to_string_lossy();
                SPECIAL_FILES.iter().any(|s| name.eq_ignore_ascii_case(s))
            })
            .unwrap_or(false)
    }
}

/// Read one file as text, tolerating invalid UTF-8 by lossy decoding.
///
/// A read failure maps to `UnreadableFile`; the caller records a warning and
/// continues the run.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| AnalysisError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn collects_source_special_and_directories() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/Http/Controllers/UserController.php", "<?php\n");
        write(tmp.path(), "composer.json", "{}");
        write(tmp.path(), ".env", "DB_CONNECTION=mysql\n");
        write(tmp.path(), "README.md", "# readme");

        let config = AnalysisConfig::default();
        let outcome = SourceWalker::new(tmp.path(), &config).walk().unwrap();

        assert_eq!(outcome.source_files.len(), 1);
        assert_eq!(outcome.special_files.len(), 2);
        assert!(outcome
            .directories
            .iter()
            .any(|d| d == &PathBuf::from("app/Http/Controllers")));
    }

    #[test]
    fn ignore_globs_skip_whole_subtrees() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "vendor/pkg/src/Thing.php", "<?php\n");
        write(tmp.path(), "src/index.php", "<?php\n");

        let config = AnalysisConfig::default();
        let outcome = SourceWalker::new(tmp.path(), &config).walk().unwrap();

        assert_eq!(outcome.source_files.len(), 1);
        assert_eq!(
            outcome.source_files[0].relative,
            PathBuf::from("src/index.php")
        );
    }

    #[test]
    fn scan_budget_caps_source_files() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            write(tmp.path(), &format!("src/f{i}.php"), "<?php\n");
        }
        let config = AnalysisConfig {
            max_files_to_scan: 3,
            ..AnalysisConfig::default()
        };
        let outcome = SourceWalker::new(tmp.path(), &config).walk().unwrap();
        assert_eq!(outcome.source_files.len(), 3);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn oversize_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/big.php", &"x".repeat(64));
        write(tmp.path(), "src/small.php", "<?php\n");
        let config = AnalysisConfig {
            max_file_size_bytes: 32,
            ..AnalysisConfig::default()
        };
        let outcome = SourceWalker::new(tmp.path(), &config).walk().unwrap();
        assert_eq!(outcome.source_files.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn lossy_read_never_fails_on_binary_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("junk.php");
        fs::write(&path, [0x3c, 0x3f, 0xff, 0xfe, 0x00, 0x70]).unwrap();
        let text = read_text(&path).unwrap();
        assert!(text.starts_with("<?"));
    }
}
