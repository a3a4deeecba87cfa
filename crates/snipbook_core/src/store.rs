//! One-JSON-file-per-snippet storage over a data directory.

use crate::constants::{NEW_SNIPPET_TITLE, SNIPPET_FILE_EXTENSION, SNIPPET_FILE_PREFIX};
use crate::error::AppError;
use crate::models::snippet::{SnippetKind, SnippetRecord};
use crate::time_util::{file_name_timestamp, record_timestamp};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A record together with the file it lives in.
///
/// The path is the snippet's identity; it does not change when the title or
/// type is edited.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnippet {
    pub path: PathBuf,
    pub record: SnippetRecord,
}

impl StoredSnippet {
    /// Path as shown in the library's File column.
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// A file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: AppError,
}

/// Result of [`SnippetStore::load_all`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Loaded snippets sorted ascending by timestamp.
    pub snippets: Vec<StoredSnippet>,
    pub failures: Vec<LoadFailure>,
}

/// Snippet files under a single directory.
#[derive(Debug, Clone)]
pub struct SnippetStore {
    dir: PathBuf,
}

impl SnippetStore {
    /// Open the store, creating `dir` when missing.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| AppError::io(&dir, err))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a bare file name against the data directory.
    ///
    /// Values containing a path separator are used as given.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let candidate = Path::new(name);
        if candidate.components().count() > 1 || candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.dir.join(candidate)
        }
    }

    /// Load every `*.json` file in the directory.
    ///
    /// Unreadable or malformed files are logged and reported in
    /// [`LoadReport::failures`]; they never abort the load.
    ///
    /// # Errors
    /// Returns an error only if the directory itself cannot be listed.
    pub fn load_all(&self) -> Result<LoadReport, AppError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|err| AppError::io(&self.dir, err))? {
            let entry = entry.map_err(|err| AppError::io(&self.dir, err))?;
            let path = entry.path();
            let is_snippet = path
                .extension()
                .is_some_and(|ext| ext == SNIPPET_FILE_EXTENSION);
            if is_snippet && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut report = LoadReport::default();
        for path in paths {
            match self.read(&path) {
                Ok(record) => report.snippets.push(StoredSnippet { path, record }),
                Err(error) => {
                    tracing::warn!("Skipping unreadable snippet {:?}: {}", path, error);
                    report.failures.push(LoadFailure { path, error });
                }
            }
        }
        report
            .snippets
            .sort_by(|a, b| a.record.timestamp.cmp(&b.record.timestamp));
        Ok(report)
    }

    /// Read a single record.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for a missing file, otherwise I/O or JSON errors.
    pub fn read(&self, path: &Path) -> Result<SnippetRecord, AppError> {
        let raw = fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("snippet {}", path.display())),
            _ => AppError::io(path, err),
        })?;
        serde_json::from_str(&raw).map_err(|err| AppError::json(path, err))
    }

    /// Rewrite the whole record at `path`.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: &Path, record: &SnippetRecord) -> Result<(), AppError> {
        let body = to_pretty_json(record).map_err(|err| AppError::json(path, err))?;
        fs::write(path, body).map_err(|err| AppError::io(path, err))
    }

    /// Create a fresh plain-text snippet stamped with the current local time.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create(&self) -> Result<StoredSnippet, AppError> {
        self.create_at(Local::now())
    }

    /// Create a fresh snippet stamped with `now`.
    ///
    /// A numeric suffix is appended to the file name when it already exists.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create_at(&self, now: DateTime<Local>) -> Result<StoredSnippet, AppError> {
        let record = SnippetRecord::new(
            SnippetKind::PlainText,
            NEW_SNIPPET_TITLE.to_string(),
            String::new(),
            record_timestamp(now),
        );
        let body = to_pretty_json(&record).map_err(|err| AppError::json(&self.dir, err))?;
        let stem = format!("{}{}", SNIPPET_FILE_PREFIX, file_name_timestamp(now));

        let mut attempt = 0usize;
        loop {
            let file_name = if attempt == 0 {
                format!("{}.{}", stem, SNIPPET_FILE_EXTENSION)
            } else {
                format!("{}_{}.{}", stem, attempt, SNIPPET_FILE_EXTENSION)
            };
            let path = self.dir.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(body.as_bytes())
                        .map_err(|err| AppError::io(&path, err))?;
                    tracing::debug!("Created snippet at: {:?}", path);
                    return Ok(StoredSnippet { path, record });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => return Err(AppError::io(&path, err)),
            }
        }
    }

    /// Delete the snippet file at `path`.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the file is already gone.
    pub fn delete(&self, path: &Path) -> Result<(), AppError> {
        fs::remove_file(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("snippet {}", path.display())),
            _ => AppError::io(path, err),
        })
    }
}

/// Four-space indented JSON with non-ASCII text left unescaped.
fn to_pretty_json(record: &SnippetRecord) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
