//! Shell-agnostic orchestration: storage, library rows, tree filter, search
//! history, editor session and autosave wired together the way a snippet
//! manager window drives them.

use crate::autosave::AutosaveTimer;
use crate::config::Config;
use crate::error::AppError;
use crate::filter::{FilterChange, Query, QueryMode, RowPath, TreeFilter};
use crate::history::SearchHistory;
use crate::library::Library;
use crate::session::{ChangeKind, EditorSession};
use crate::store::{LoadFailure, SnippetStore, StoredSnippet};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Snippet manager state for one data directory.
pub struct Workbench {
    config: Config,
    store: SnippetStore,
    library: Library,
    filter: TreeFilter,
    history: SearchHistory,
    session: EditorSession,
    autosave: AutosaveTimer,
    load_failures: Vec<LoadFailure>,
}

impl Workbench {
    /// Open the data directory, load every snippet and the search history.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or listed.
    /// Individual unreadable snippets are reported by [`Workbench::load_failures`].
    pub fn open(config: Config) -> Result<Self, AppError> {
        let store = SnippetStore::open(&config.data_dir)?;
        let report = store.load_all()?;
        let library = Library::from_snippets(&report.snippets);
        let history = SearchHistory::load(&config.history_path, config.history_limit);
        let autosave = AutosaveTimer::new(config.auto_save_delay(), Instant::now());
        tracing::info!(
            "Loaded {} snippets from {:?} ({} skipped)",
            report.snippets.len(),
            store.dir(),
            report.failures.len()
        );
        Ok(Self {
            config,
            store,
            library,
            filter: TreeFilter::new(),
            history,
            session: EditorSession::new(),
            autosave,
            load_failures: report.failures,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn filter(&self) -> &TreeFilter {
        &self.filter
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Editor state for field edits; call [`Workbench::save_if_dirty`] or
    /// [`Workbench::tick`] to persist.
    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    /// Files skipped during the initial load.
    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.load_failures
    }

    /// Save pending changes of the open snippet, then open `path`.
    ///
    /// # Errors
    /// Returns an error if saving the current snippet or reading `path` fails.
    pub fn select(&mut self, path: &Path) -> Result<(), AppError> {
        self.save_if_dirty()?;
        let record = self.store.read(path)?;
        self.session.open(&StoredSnippet {
            path: path.to_path_buf(),
            record,
        });
        Ok(())
    }

    /// Select the snippet shown in library row `row`.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for an unknown row.
    pub fn select_row(&mut self, row: &[usize]) -> Result<(), AppError> {
        let path = self
            .library
            .file_at(row)
            .ok_or_else(|| AppError::NotFound(format!("library row {:?}", row)))?;
        self.select(&path)
    }

    /// Write the open snippet when it differs from its snapshot.
    ///
    /// Returns the changed fields, or an empty list when nothing was written.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn save_if_dirty(&mut self) -> Result<Vec<ChangeKind>, AppError> {
        let changes = self.session.pending_changes();
        if changes.is_empty() {
            return Ok(changes);
        }
        let saved = self.session.save(&self.store)?;
        self.library.change_item(
            &saved.path,
            &saved.record.kind,
            &saved.record.title,
            &saved.record.timestamp,
        );
        tracing::info!("changes={:?}", changes);
        Ok(changes)
    }

    /// Create a new snippet, add it to the library and open it.
    ///
    /// # Errors
    /// Returns an error if the current snippet cannot be saved or the new file
    /// cannot be created.
    pub fn add_snippet(&mut self) -> Result<StoredSnippet, AppError> {
        self.save_if_dirty()?;
        let created = self.store.create()?;
        self.library.add_item(
            &created.path,
            &created.record.kind,
            &created.record.title,
            &created.record.timestamp,
        );
        self.session.open(&created);
        Ok(created)
    }

    /// Delete the open snippet and remove its library row.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when nothing is open, or the storage error.
    pub fn delete_snippet(&mut self) -> Result<PathBuf, AppError> {
        let path = self
            .session
            .path()
            .map(Path::to_path_buf)
            .ok_or_else(|| AppError::BadRequest("no snippet is selected".to_string()))?;
        self.delete_path(&path)?;
        Ok(path)
    }

    /// Delete the snippet file at `path` without parsing it.
    ///
    /// Unreadable files reported by [`Workbench::load_failures`] can be removed
    /// this way. Closes the session when it shows `path`.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the file does not exist.
    pub fn delete_path(&mut self, path: &Path) -> Result<(), AppError> {
        self.store.delete(path)?;
        self.library.del_item(path);
        self.load_failures.retain(|failure| failure.path != path);
        if self.session.path() == Some(path) {
            self.session.close();
        }
        Ok(())
    }

    /// Install a query on the library filter.
    pub fn set_query(&mut self, query: Query) -> FilterChange {
        self.filter.set_query(query)
    }

    /// Filter the library by search-box text using the configured mode.
    pub fn search(&mut self, text: &str) -> FilterChange {
        let mode = if self.config.regex_search {
            QueryMode::Regex
        } else {
            QueryMode::Literal
        };
        self.set_query(Query {
            text: text.to_string(),
            mode,
            case_sensitive: false,
        })
    }

    /// Visible library rows in display order.
    pub fn visible_rows(&self) -> Vec<RowPath> {
        self.filter.visible_paths(self.library.rows())
    }

    /// Rows a tree view must expand to reveal every match.
    pub fn expansion_rows(&self) -> Vec<RowPath> {
        self.filter.expansion_paths(self.library.rows())
    }

    /// Remember the current query text in the search history.
    ///
    /// # Errors
    /// Returns an error if the history file cannot be written.
    pub fn record_search(&mut self) -> Result<bool, AppError> {
        let keyword = self.filter.query().text.clone();
        self.history.record(&keyword)
    }

    /// Autosave hook for the shell's event loop.
    ///
    /// Storage errors are logged and swallowed so the loop keeps running.
    pub fn tick(&mut self, now: Instant) -> Vec<ChangeKind> {
        if !self.autosave.poll(now) {
            return Vec::new();
        }
        match self.save_if_dirty() {
            Ok(changes) => changes,
            Err(err) => {
                tracing::error!("Autosave failed: {}", err);
                Vec::new()
            }
        }
    }

    /// Final save before the shell exits.
    ///
    /// # Errors
    /// Returns an error if the open snippet cannot be written.
    pub fn close(mut self) -> Result<(), AppError> {
        self.save_if_dirty()?;
        self.session.close();
        Ok(())
    }
}
