//! Editor pane state without widgets: the open snippet, its placeholder
//! bindings and dirty tracking against the last loaded or saved snapshot.

use crate::error::AppError;
use crate::models::snippet::{SnippetKind, SnippetRecord};
use crate::placeholder::{
    extract_placeholders, is_placeholder_token, preview, reconcile, OutputMode, PlaceholderBindings,
    Rendered,
};
use crate::store::{SnippetStore, StoredSnippet};
use crate::time_util::record_timestamp;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which part of the open snippet differs from its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Content,
    Title,
    Kind,
    Placeholders,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Content => "content",
            ChangeKind::Title => "title",
            ChangeKind::Kind => "content type",
            ChangeKind::Placeholders => "placeholder",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of [`EditorSession::set_content`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    /// `true` when placeholder inputs must be rebuilt.
    pub layout_changed: bool,
    /// Placeholder tokens of the new content in layout order.
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    title: String,
    kind: SnippetKind,
    content: String,
    bindings: PlaceholderBindings,
}

#[derive(Debug, Clone)]
struct OpenSnippet {
    path: PathBuf,
    title: String,
    kind: SnippetKind,
    content: String,
    tokens: Vec<String>,
    bindings: PlaceholderBindings,
    // Non-placeholder keys carried through saves untouched.
    extra: Map<String, Value>,
    snapshot: Snapshot,
}

impl OpenSnippet {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            title: self.title.clone(),
            kind: self.kind.clone(),
            content: self.content.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

/// State of the editor pane for at most one open snippet.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    open: Option<OpenSnippet>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `snippet` into the editor, replacing whatever was open.
    ///
    /// Stored placeholder values are restored only for tokens that occur in
    /// the content; the loaded state becomes the clean snapshot.
    pub fn open(&mut self, snippet: &StoredSnippet) {
        let record = &snippet.record;
        let tokens = extract_placeholders(&record.content);
        let mut bindings = PlaceholderBindings::from_tokens(tokens.iter().cloned());
        for (token, value) in record.placeholders() {
            bindings.set(token, value);
        }
        let mut extra = record.extra.clone();
        extra.retain(|key, _| !is_placeholder_token(key));
        let snapshot = Snapshot {
            title: record.title.clone(),
            kind: record.kind.clone(),
            content: record.content.clone(),
            bindings: bindings.clone(),
        };

        let open = OpenSnippet {
            path: snippet.path.clone(),
            title: record.title.clone(),
            kind: record.kind.clone(),
            content: record.content.clone(),
            tokens,
            bindings,
            extra,
            snapshot,
        };
        tracing::debug!("Opened snippet {:?}", open.path);
        self.open = Some(open);
    }

    /// Close the editor without saving.
    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.open.as_ref().map(|open| open.path.as_path())
    }

    pub fn title(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.title.as_str())
    }

    pub fn kind(&self) -> Option<&SnippetKind> {
        self.open.as_ref().map(|open| &open.kind)
    }

    pub fn content(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.content.as_str())
    }

    /// Placeholder tokens of the current content in layout order.
    pub fn tokens(&self) -> &[String] {
        self.open
            .as_ref()
            .map(|open| open.tokens.as_slice())
            .unwrap_or_default()
    }

    pub fn bindings(&self) -> Option<&PlaceholderBindings> {
        self.open.as_ref().map(|open| &open.bindings)
    }

    fn require_open(&mut self) -> Result<&mut OpenSnippet, AppError> {
        self.open
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("no snippet is open".to_string()))
    }

    /// Replace the content and reconcile placeholder bindings.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when no snippet is open.
    pub fn set_content(&mut self, text: &str) -> Result<ContentUpdate, AppError> {
        let open = self.require_open()?;
        let new_tokens = extract_placeholders(text);
        let reconciled = reconcile(&new_tokens, &open.tokens, &open.bindings);
        open.content = text.to_string();
        open.bindings = reconciled.bindings;
        open.tokens = new_tokens;
        Ok(ContentUpdate {
            layout_changed: reconciled.layout_changed,
            tokens: open.tokens.clone(),
        })
    }

    /// Set the input value for one placeholder.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when `token` is not in the content, or
    /// [`AppError::BadRequest`] when no snippet is open.
    pub fn set_field(&mut self, token: &str, value: &str) -> Result<(), AppError> {
        let open = self.require_open()?;
        if open.bindings.set(token, value) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("placeholder {}", token)))
        }
    }

    /// # Errors
    /// Returns [`AppError::BadRequest`] when no snippet is open.
    pub fn set_title(&mut self, title: &str) -> Result<(), AppError> {
        self.require_open()?.title = title.to_string();
        Ok(())
    }

    /// # Errors
    /// Returns [`AppError::BadRequest`] when no snippet is open.
    pub fn set_kind(&mut self, kind: SnippetKind) -> Result<(), AppError> {
        self.require_open()?.kind = kind;
        Ok(())
    }

    /// Substituted preview in the mode chosen by the current kind.
    pub fn preview(&self) -> Option<Rendered> {
        let mode = self.open.as_ref()?.kind.output_mode();
        self.preview_as(mode)
    }

    /// Substituted preview in an explicit mode.
    pub fn preview_as(&self, mode: OutputMode) -> Option<Rendered> {
        self.open
            .as_ref()
            .map(|open| preview(&open.content, &open.bindings, mode))
    }

    /// Fields that differ from the last loaded or saved snapshot.
    pub fn pending_changes(&self) -> Vec<ChangeKind> {
        let Some(open) = self.open.as_ref() else {
            return Vec::new();
        };
        let snapshot = &open.snapshot;
        let mut changes = Vec::new();
        if open.content != snapshot.content {
            changes.push(ChangeKind::Content);
        }
        if open.title != snapshot.title {
            changes.push(ChangeKind::Title);
        }
        if open.kind != snapshot.kind {
            changes.push(ChangeKind::Kind);
        }
        if !open.bindings.same_values(&snapshot.bindings) {
            changes.push(ChangeKind::Placeholders);
        }
        changes
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending_changes().is_empty()
    }

    /// Record for the current editor state stamped with `timestamp`.
    ///
    /// Every token in the content gets a value; unbound ones are stored as `""`.
    pub fn to_record(&self, timestamp: &str) -> Option<SnippetRecord> {
        let open = self.open.as_ref()?;
        let mut record = SnippetRecord::new(
            open.kind.clone(),
            open.title.clone(),
            open.content.clone(),
            timestamp.to_string(),
        );
        record.extra = open.extra.clone();
        let values: PlaceholderBindings = open
            .tokens
            .iter()
            .map(|token| (token.as_str(), open.bindings.get(token).unwrap_or_default()))
            .collect();
        record.set_placeholders(&values);
        Some(record)
    }

    /// Write the open snippet with the current local time.
    ///
    /// # Errors
    /// Returns an error when nothing is open or the write fails.
    pub fn save(&mut self, store: &SnippetStore) -> Result<StoredSnippet, AppError> {
        self.save_at(store, Local::now())
    }

    /// Write the open snippet stamped with `now` and make it the clean snapshot.
    ///
    /// # Errors
    /// Returns an error when nothing is open or the write fails.
    pub fn save_at(
        &mut self,
        store: &SnippetStore,
        now: DateTime<Local>,
    ) -> Result<StoredSnippet, AppError> {
        let timestamp = record_timestamp(now);
        let record = self
            .to_record(&timestamp)
            .ok_or_else(|| AppError::BadRequest("no snippet is open".to_string()))?;
        let open = self.require_open()?;
        store.write(&open.path, &record)?;
        open.snapshot = open.snapshot();
        tracing::info!("Saved snippet {:?} ({})", open.path, record.title);
        Ok(StoredSnippet {
            path: open.path.clone(),
            record,
        })
    }
}

#[cfg(test)]
mod tests;
