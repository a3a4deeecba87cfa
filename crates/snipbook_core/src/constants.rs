//! Shared constants used across snipbook crates.

/// Default autosave polling interval in milliseconds.
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 2_000;

/// Default upper bound for persisted search keywords.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// File name of the search history inside the config directory.
pub const HISTORY_FILE_NAME: &str = "search_history_tree_view.txt";

/// Extension of snippet record files.
pub const SNIPPET_FILE_EXTENSION: &str = "json";

/// File name prefix for newly created snippets.
pub const SNIPPET_FILE_PREFIX: &str = "snippet_";

/// Title given to newly created snippets.
pub const NEW_SNIPPET_TITLE: &str = "New Snippet";

/// Fallback title for records missing a `title` key.
pub const DEFAULT_TITLE: &str = "Unknown";

/// Column headers of the library tree.
pub const LIBRARY_COLUMNS: [&str; 4] = ["Title", "Type", "File", "Timestamp"];
