//! Newline-delimited search keyword history, most recent first.

use crate::error::AppError;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Bounded, deduplicated list of past search keywords backed by a text file.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    path: PathBuf,
    limit: usize,
    entries: Vec<String>,
}

impl SearchHistory {
    /// Load history from `path`.
    ///
    /// A missing file is an empty history. An unreadable file is logged and
    /// treated as empty so search keeps working.
    pub fn load(path: impl Into<PathBuf>, limit: usize) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => parse_entries(&raw, limit),
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                tracing::warn!("Failed to read search history {:?}: {}", path, err);
                Vec::new()
            }
        };
        Self {
            path,
            limit,
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keywords, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `keyword` to the front and rewrite the history file.
    ///
    /// Blank keywords are ignored. The file is rewritten even when `keyword`
    /// is already first. Returns `true` when the order changed.
    ///
    /// # Errors
    /// Returns an error if the history file cannot be written.
    pub fn record(&mut self, keyword: &str) -> Result<bool, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(false);
        }
        let changed = self.entries.first().map(String::as_str) != Some(keyword);
        self.entries.retain(|entry| entry != keyword);
        self.entries.insert(0, keyword.to_string());
        self.entries.truncate(self.limit);
        self.save()?;
        Ok(changed)
    }

    /// Rewrite the history file.
    ///
    /// # Errors
    /// Returns an error if the parent directory or file cannot be written.
    pub fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| AppError::io(parent, err))?;
        }
        let mut body = self.entries.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        fs::write(&self.path, body).map_err(|err| AppError::io(&self.path, err))
    }
}

fn parse_entries(raw: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .take(limit)
        .map(str::to_string)
        .collect()
}
