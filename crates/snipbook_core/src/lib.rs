//! Core domain library for snipbook (filtering, placeholders, storage, session).

/// Autosave polling timer.
pub mod autosave;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across snipbook crates.
pub mod constants;
/// Application error types.
pub mod error;
/// Recursive tree filtering with literal and regex queries.
pub mod filter;
/// Regex-rule syntax highlighting per snippet language.
pub mod highlight;
/// Persisted search keyword history.
pub mod history;
/// Snippet library tree rows.
pub mod library;
/// Markdown to HTML preview rendering.
pub mod markdown;
/// Snippet records and kinds.
pub mod models;
/// Placeholder extraction, reconciliation and substitution.
pub mod placeholder;
/// Editor pane state and dirty tracking.
pub mod session;
/// One-file-per-snippet JSON storage.
pub mod store;
/// Shared text normalization helpers.
pub mod text;
/// Local timestamp formatting.
pub mod time_util;
/// Shell-agnostic orchestration of store, library, filter and session.
pub mod workbench;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_AUTO_SAVE_INTERVAL_MS, DEFAULT_HISTORY_LIMIT};
pub use error::AppError;
pub use filter::{FilterChange, Query, QueryMode, RowPath, TreeFilter, TreeRow};
pub use history::SearchHistory;
pub use library::Library;
pub use models::snippet::{SnippetKind, SnippetRecord};
pub use placeholder::{OutputMode, PlaceholderBindings, Rendered};
pub use session::{ChangeKind, EditorSession};
pub use store::{SnippetStore, StoredSnippet};
pub use workbench::Workbench;
