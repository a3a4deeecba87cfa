//! Snippet records as stored on disk, and the closed set of snippet kinds.

use crate::constants::DEFAULT_TITLE;
use crate::highlight::Language;
use crate::placeholder::{is_placeholder_token, OutputMode, PlaceholderBindings};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Snippet content type shown in the library and used to pick a highlighter.
///
/// Unrecognized labels read from disk are kept verbatim in [`SnippetKind::Other`]
/// so they survive a save round-trip; they behave like plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SnippetKind {
    #[default]
    PlainText,
    Python,
    Cpp,
    Markdown,
    Other(String),
}

impl SnippetKind {
    /// Kinds offered by type selectors, in display order.
    pub const SELECTABLE: [SnippetKind; 4] = [
        SnippetKind::PlainText,
        SnippetKind::Python,
        SnippetKind::Cpp,
        SnippetKind::Markdown,
    ];

    /// Stored/display label.
    pub fn label(&self) -> &str {
        match self {
            SnippetKind::PlainText => "Plain text",
            SnippetKind::Python => "Python",
            SnippetKind::Cpp => "C++",
            SnippetKind::Markdown => "Markdown",
            SnippetKind::Other(label) => label.as_str(),
        }
    }

    /// Exact label match as written by [`SnippetKind::label`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "Plain text" => SnippetKind::PlainText,
            "Python" => SnippetKind::Python,
            "C++" => SnippetKind::Cpp,
            "Markdown" => SnippetKind::Markdown,
            other => SnippetKind::Other(other.to_string()),
        }
    }

    /// Highlighter language for this kind.
    pub fn language(&self) -> Language {
        match self {
            SnippetKind::Python => Language::Python,
            SnippetKind::Cpp => Language::Cpp,
            SnippetKind::Markdown => Language::Markdown,
            SnippetKind::PlainText | SnippetKind::Other(_) => Language::PlainText,
        }
    }

    /// Preview packaging for this kind.
    pub fn output_mode(&self) -> OutputMode {
        match self {
            SnippetKind::Python | SnippetKind::Cpp => OutputMode::Syntax(self.language()),
            SnippetKind::Markdown => OutputMode::MarkdownHtml,
            SnippetKind::PlainText | SnippetKind::Other(_) => OutputMode::MarkedHtml,
        }
    }
}

impl From<String> for SnippetKind {
    fn from(value: String) -> Self {
        SnippetKind::from_label(&value)
    }
}

impl From<SnippetKind> for String {
    fn from(value: SnippetKind) -> Self {
        match value {
            SnippetKind::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for SnippetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lenient parsing for user input (`cpp`, `c++`, `py`, `md`, `text`, ...).
///
/// Unknown values are rejected rather than turned into [`SnippetKind::Other`].
impl FromStr for SnippetKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "plain text" | "plain" | "text" | "txt" => Ok(SnippetKind::PlainText),
            "python" | "py" => Ok(SnippetKind::Python),
            "c++" | "cpp" | "cxx" => Ok(SnippetKind::Cpp),
            "markdown" | "md" => Ok(SnippetKind::Markdown),
            _ => Err(format!(
                "unknown snippet type '{}' (expected one of: {})",
                value.trim(),
                SnippetKind::SELECTABLE
                    .iter()
                    .map(SnippetKind::label)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// One snippet file: fixed fields plus `$placeholder` values flattened in.
///
/// Missing fields fall back to defaults instead of failing the load. Keys that
/// are neither fixed fields nor string-valued placeholders are kept in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetRecord {
    #[serde(rename = "type", default)]
    pub kind: SnippetKind,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SnippetRecord {
    fn default() -> Self {
        Self {
            kind: SnippetKind::default(),
            title: default_title(),
            content: String::new(),
            timestamp: String::new(),
            extra: Map::new(),
        }
    }
}

impl SnippetRecord {
    /// Create a record without placeholder values.
    pub fn new(kind: SnippetKind, title: String, content: String, timestamp: String) -> Self {
        Self {
            kind,
            title,
            content,
            timestamp,
            extra: Map::new(),
        }
    }

    /// Stored placeholder values in file order.
    pub fn placeholders(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extra.iter().filter_map(|(key, value)| {
            if !is_placeholder_token(key) {
                return None;
            }
            value.as_str().map(|text| (key.as_str(), text))
        })
    }

    /// Stored value for a single placeholder token.
    pub fn placeholder(&self, token: &str) -> Option<&str> {
        if !is_placeholder_token(token) {
            return None;
        }
        self.extra.get(token).and_then(Value::as_str)
    }

    /// Replace every stored placeholder value with `bindings`.
    ///
    /// Non-placeholder extra keys are preserved.
    pub fn set_placeholders(&mut self, bindings: &PlaceholderBindings) {
        self.extra.retain(|key, _| !is_placeholder_token(key));
        for (token, value) in bindings.iter() {
            self.extra
                .insert(token.to_string(), Value::String(value.to_string()));
        }
    }
}
