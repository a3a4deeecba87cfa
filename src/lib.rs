//! Root crate facade for snipbook.

pub use snipbook_core::{
    autosave, config, constants, error, filter, highlight, history, library, markdown, models,
    placeholder, session, store, text, time_util, workbench, AppError, ChangeKind, Config,
    EditorSession, FilterChange, Library, OutputMode, PlaceholderBindings, Query, QueryMode,
    Rendered, RowPath, SearchHistory, SnippetKind, SnippetRecord, SnippetStore, StoredSnippet,
    TreeFilter, TreeRow, Workbench, DEFAULT_AUTO_SAVE_INTERVAL_MS, DEFAULT_HISTORY_LIMIT,
};
