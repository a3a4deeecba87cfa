//! Placeholder extraction, binding reconciliation and preview substitution.
//!
//! A placeholder is `$` followed by one or more `[A-Za-z0-9_]`. The editor
//! re-scans the source on every change; [`reconcile`] decides whether the set
//! of placeholder inputs must be rebuilt or can be kept as-is, so typing never
//! discards values the user already entered.

use crate::highlight::Language;
use crate::markdown::{
    markdown_to_html, markdown_to_marked_html, strip_marks, MARK_END, MARK_START,
};
use crate::text::escape_html;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Pattern matching a single placeholder token.
pub const PLACEHOLDER_PATTERN: &str = r"\$[A-Za-z0-9_]+";

const VALUE_SPAN_OPEN: &str = r#"<span style="color: black; font-weight: bold;">"#;
const VALUE_SPAN_CLOSE: &str = "</span>";
const MARKED_PARAGRAPH_OPEN: &str = r#"<p style="white-space: pre-wrap; color: green;">"#;
const MARKED_PARAGRAPH_CLOSE: &str = "</p>";

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("static placeholder pattern"))
}

/// Returns `true` when `value` is exactly one placeholder token.
pub fn is_placeholder_token(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('$') else {
        return false;
    };
    !rest.is_empty()
        && rest
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Unique placeholder tokens of `text` in order of first appearance.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for found in placeholder_regex().find_iter(text) {
        if seen.insert(found.as_str()) {
            tokens.push(found.as_str().to_string());
        }
    }
    tokens
}

/// Ordered placeholder token -> value bindings.
///
/// Order follows first appearance in the source text and is what a shell uses
/// to lay out one input per placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderBindings {
    entries: Vec<(String, String)>,
}

impl PlaceholderBindings {
    /// Empty bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// One empty binding per token.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tokens
            .into_iter()
            .map(|token| (token.into(), String::new()))
            .collect()
    }

    /// Bound value for `token`.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(bound, _)| bound == token)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.iter().any(|(bound, _)| bound == token)
    }

    /// Update an existing binding; returns `false` when `token` is unknown.
    pub fn set(&mut self, token: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|(bound, _)| bound == token) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Update or append a binding.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        if !self.set(&token, value.clone()) {
            self.entries.push((token, value));
        }
    }

    /// Bound tokens in layout order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(token, _)| token.as_str())
    }

    /// `(token, value)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(token, value)| (token.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order-insensitive comparison of bound values.
    pub fn same_values(&self, other: &PlaceholderBindings) -> bool {
        self.len() == other.len() && self.iter().all(|(token, value)| other.get(token) == Some(value))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderBindings {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut bindings = PlaceholderBindings::new();
        for (token, value) in iter {
            bindings.insert(token, value);
        }
        bindings
    }
}

/// Result of reconciling a fresh token scan against the previous bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub bindings: PlaceholderBindings,
    /// `true` when the token set changed and inputs must be rebuilt.
    pub layout_changed: bool,
}

/// Reconcile `new_tokens` with the previous scan.
///
/// An unchanged token set (order and duplicates ignored) returns the previous
/// bindings verbatim. Otherwise bindings are rebuilt in `new_tokens` order,
/// carrying values of surviving tokens and starting new ones empty.
pub fn reconcile(
    new_tokens: &[String],
    previous_tokens: &[String],
    previous_bindings: &PlaceholderBindings,
) -> Reconciled {
    let new_set: HashSet<&str> = new_tokens.iter().map(String::as_str).collect();
    let previous_set: HashSet<&str> = previous_tokens.iter().map(String::as_str).collect();
    if new_set == previous_set {
        return Reconciled {
            bindings: previous_bindings.clone(),
            layout_changed: false,
        };
    }

    let mut bindings = PlaceholderBindings::new();
    for token in new_tokens {
        if bindings.contains(token) {
            continue;
        }
        let carried = previous_bindings.get(token).unwrap_or_default();
        bindings.insert(token.as_str(), carried);
    }
    Reconciled {
        bindings,
        layout_changed: true,
    }
}

/// Replace every bound, non-empty placeholder in `text`.
///
/// Substitution is a single left-to-right pass over whole tokens: `$a` never
/// matches inside `$ab`, and inserted values are not rescanned. Tokens bound to
/// an empty string, or not bound at all, stay in the output verbatim.
pub fn substitute(
    text: &str,
    bindings: &PlaceholderBindings,
    wrap: Option<&dyn Fn(&str) -> String>,
) -> String {
    if bindings.is_empty() {
        return text.to_string();
    }
    placeholder_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let token = &caps[0];
            match bindings.get(token).filter(|value| !value.is_empty()) {
                Some(value) => match wrap {
                    Some(wrap) => wrap(value),
                    None => value.to_string(),
                },
                None => token.to_string(),
            }
        })
        .into_owned()
}

/// How substituted text is packaged for the preview pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Raw text.
    Plain,
    /// Raw text destined for a syntax-coloured display.
    Syntax(Language),
    /// Escaped text in a pre-wrap paragraph with substituted values in bold.
    MarkedHtml,
    /// Markdown rendered to an HTML document.
    MarkdownHtml,
}

/// Preview payload produced by [`render`] and [`preview`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    Code { language: Language, text: String },
    Html(String),
}

impl Rendered {
    /// Text or markup as a single string.
    pub fn as_str(&self) -> &str {
        match self {
            Rendered::Text(text) | Rendered::Html(text) => text,
            Rendered::Code { text, .. } => text,
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, Rendered::Html(_))
    }
}

fn marked_paragraph(body: &str) -> String {
    format!("{MARKED_PARAGRAPH_OPEN}{body}{MARKED_PARAGRAPH_CLOSE}")
}

fn value_span(value: &str) -> String {
    format!("{VALUE_SPAN_OPEN}{}{VALUE_SPAN_CLOSE}", escape_html(value))
}

/// Package already-substituted text for `mode`.
pub fn render(substituted: &str, mode: OutputMode) -> Rendered {
    match mode {
        OutputMode::Plain => Rendered::Text(substituted.to_string()),
        OutputMode::Syntax(language) => Rendered::Code {
            language,
            text: substituted.to_string(),
        },
        OutputMode::MarkedHtml => Rendered::Html(marked_paragraph(&escape_html(substituted))),
        OutputMode::MarkdownHtml => Rendered::Html(markdown_to_html(substituted)),
    }
}

/// Substitute and render in one step, highlighting values in HTML modes.
pub fn preview(text: &str, bindings: &PlaceholderBindings, mode: OutputMode) -> Rendered {
    match mode {
        OutputMode::Plain | OutputMode::Syntax(_) => render(&substitute(text, bindings, None), mode),
        OutputMode::MarkedHtml => {
            // Escaping leaves `$word` tokens intact, so substitution can run on
            // the escaped text and inject markup safely.
            let body = substitute(&escape_html(text), bindings, Some(&value_span));
            Rendered::Html(marked_paragraph(&body))
        }
        OutputMode::MarkdownHtml => {
            // Spans are injected after parsing so values inside code stay highlighted.
            let mark = |value: &str| format!("{MARK_START}{}{MARK_END}", strip_marks(value));
            let marked = substitute(&strip_marks(text), bindings, Some(&mark));
            Rendered::Html(markdown_to_marked_html(
                &marked,
                VALUE_SPAN_OPEN,
                VALUE_SPAN_CLOSE,
            ))
        }
    }
}
