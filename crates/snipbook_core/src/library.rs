//! Library tree rows: one `[Title, Type, File, Timestamp]` row per snippet.

use crate::constants::LIBRARY_COLUMNS;
use crate::filter::{RowPath, TreeRow};
use crate::models::snippet::SnippetKind;
use crate::store::StoredSnippet;
use std::path::{Path, PathBuf};

/// Column index of the snippet title.
pub const TITLE_COLUMN: usize = 0;
/// Column index of the snippet type label.
pub const TYPE_COLUMN: usize = 1;
/// Column index of the snippet file path (hidden in a GUI, still searchable).
pub const FILE_COLUMN: usize = 2;
/// Column index of the snippet timestamp.
pub const TIMESTAMP_COLUMN: usize = 3;

/// Snippet rows addressed by file path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    rows: Vec<TreeRow>,
}

fn library_row(path: &Path, kind: &SnippetKind, title: &str, timestamp: &str) -> TreeRow {
    TreeRow::new([
        title.to_string(),
        kind.label().to_string(),
        path.to_string_lossy().into_owned(),
        timestamp.to_string(),
    ])
}

impl Library {
    /// Column headers in display order.
    pub fn headers() -> [&'static str; 4] {
        LIBRARY_COLUMNS
    }

    /// Build rows in the order given (callers pass the timestamp-sorted load).
    pub fn from_snippets(snippets: &[StoredSnippet]) -> Self {
        let rows = snippets
            .iter()
            .map(|snippet| {
                library_row(
                    &snippet.path,
                    &snippet.record.kind,
                    &snippet.record.title,
                    &snippet.record.timestamp,
                )
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row and return its path.
    pub fn add_item(
        &mut self,
        path: &Path,
        kind: &SnippetKind,
        title: &str,
        timestamp: &str,
    ) -> RowPath {
        self.rows.push(library_row(path, kind, title, timestamp));
        vec![self.rows.len() - 1]
    }

    /// Update title, type and timestamp of the row for `path`.
    ///
    /// Returns `false` when no row refers to `path`.
    pub fn change_item(
        &mut self,
        path: &Path,
        kind: &SnippetKind,
        title: &str,
        timestamp: &str,
    ) -> bool {
        let Some(idx) = self.position(path) else {
            return false;
        };
        let row = &mut self.rows[idx];
        row.columns[TITLE_COLUMN] = title.to_string();
        row.columns[TYPE_COLUMN] = kind.label().to_string();
        row.columns[TIMESTAMP_COLUMN] = timestamp.to_string();
        true
    }

    /// Remove the row for `path`; returns `false` when absent.
    pub fn del_item(&mut self, path: &Path) -> bool {
        match self.position(path) {
            Some(idx) => {
                self.rows.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Row path of the snippet stored at `path`.
    pub fn find(&self, path: &Path) -> Option<RowPath> {
        self.position(path).map(|idx| vec![idx])
    }

    /// File path stored in the row at `row`.
    pub fn file_at(&self, row: &[usize]) -> Option<PathBuf> {
        TreeRow::at(&self.rows, row)
            .and_then(|row| row.column(FILE_COLUMN))
            .map(PathBuf::from)
    }

    fn position(&self, path: &Path) -> Option<usize> {
        let needle = path.to_string_lossy();
        self.rows
            .iter()
            .position(|row| row.column(FILE_COLUMN) == Some(&*needle))
    }
}
