//! Recursive tree filtering.
//!
//! A row is visible when any of its columns matches the active query or when
//! any descendant is visible. Filtering never mutates the tree; callers get a
//! predicate ([`TreeFilter::is_visible`]) or the visible paths of a whole tree.

use crate::error::AppError;
use crate::text::contains_case_insensitive;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Index chain from the root level down to a row.
pub type RowPath = Vec<usize>;

/// A row of text columns with ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeRow {
    pub columns: Vec<String>,
    pub children: Vec<TreeRow>,
}

impl TreeRow {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeRow>) -> Self {
        self.children = children;
        self
    }

    pub fn column(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(String::as_str)
    }

    /// Row at `path` relative to `rows`.
    pub fn at<'a>(rows: &'a [TreeRow], path: &[usize]) -> Option<&'a TreeRow> {
        let (first, rest) = path.split_first()?;
        let mut row = rows.get(*first)?;
        for idx in rest {
            row = row.children.get(*idx)?;
        }
        Some(row)
    }
}

/// How query text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryMode {
    /// Substring match.
    #[default]
    Literal,
    /// Regular expression search (partial match).
    Regex,
}

/// Search box state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub mode: QueryMode,
    pub case_sensitive: bool,
}

impl Query {
    /// Case-insensitive literal query.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: QueryMode::Literal,
            case_sensitive: false,
        }
    }

    /// Case-insensitive regex query.
    pub fn regex(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: QueryMode::Regex,
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    All,
    Literal { needle: String, case_sensitive: bool },
    Regex(Regex),
}

impl Matcher {
    fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Literal {
                needle,
                case_sensitive: true,
            } => value.contains(needle.as_str()),
            Matcher::Literal { needle, .. } => contains_case_insensitive(value, needle),
            Matcher::Regex(regex) => regex.is_match(value),
        }
    }
}

/// Outcome of [`TreeFilter::set_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterChange {
    /// `false` when the pattern failed to compile and the previous filter stayed active.
    pub accepted: bool,
    /// The shell should open the ancestor chains of matching rows.
    pub expand_matches: bool,
}

/// Visible rows and the rows that must be expanded to reveal them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    /// Visible rows in pre-order.
    pub visible: Vec<RowPath>,
    /// Visible rows that have at least one visible child, in pre-order.
    pub expand: Vec<RowPath>,
}

/// Compile `pattern` the way the tree filter does.
///
/// # Errors
/// Returns [`AppError::InvalidPattern`] when the regex does not parse.
pub fn compile_pattern(pattern: &str, case_sensitive: bool) -> Result<Regex, AppError> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|err| AppError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
}

/// Query-driven row filter with a per-pattern regex cache.
#[derive(Debug, Clone)]
pub struct TreeFilter {
    query: Query,
    matcher: Matcher,
    // Invalid patterns are cached as `None` so they are reported once.
    regex_cache: HashMap<(String, bool), Option<Regex>>,
}

impl Default for TreeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFilter {
    /// A filter that shows every row.
    pub fn new() -> Self {
        Self {
            query: Query::default(),
            matcher: Matcher::All,
            regex_cache: HashMap::new(),
        }
    }

    /// Last accepted query; a rejected pattern leaves it unchanged.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// `true` when no narrowing matcher is active.
    pub fn is_pass_through(&self) -> bool {
        matches!(self.matcher, Matcher::All)
    }

    /// Number of distinct patterns compiled so far, valid or not.
    pub fn cached_patterns(&self) -> usize {
        self.regex_cache.len()
    }

    fn cached_regex(&mut self, pattern: &str, case_sensitive: bool) -> Option<Regex> {
        let key = (pattern.to_string(), case_sensitive);
        if let Some(cached) = self.regex_cache.get(&key) {
            return cached.clone();
        }
        let compiled = match compile_pattern(pattern, case_sensitive) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!("Ignoring tree filter pattern: {}", err);
                None
            }
        };
        self.regex_cache.insert(key, compiled.clone());
        compiled
    }

    /// Install a new query.
    ///
    /// An invalid regex leaves the previously active matcher in place.
    pub fn set_query(&mut self, query: Query) -> FilterChange {
        let change = match query.mode {
            QueryMode::Literal => {
                self.matcher = if query.text.is_empty() {
                    Matcher::All
                } else {
                    Matcher::Literal {
                        needle: query.text.clone(),
                        case_sensitive: query.case_sensitive,
                    }
                };
                FilterChange {
                    accepted: true,
                    expand_matches: false,
                }
            }
            QueryMode::Regex => match self.cached_regex(&query.text, query.case_sensitive) {
                Some(regex) => {
                    self.matcher = if query.text.is_empty() {
                        Matcher::All
                    } else {
                        Matcher::Regex(regex)
                    };
                    FilterChange {
                        accepted: true,
                        expand_matches: true,
                    }
                }
                None => FilterChange {
                    accepted: false,
                    expand_matches: false,
                },
            },
        };
        if change.accepted {
            self.query = query;
        }
        change
    }

    /// `true` when any column of `row` matches; descendants are not consulted.
    pub fn matches(&self, row: &TreeRow) -> bool {
        row.columns.iter().any(|value| self.matcher.matches(value))
    }

    /// `true` when `row` matches or any descendant is visible.
    pub fn is_visible(&self, row: &TreeRow) -> bool {
        self.matches(row) || row.children.iter().any(|child| self.is_visible(child))
    }

    /// Visible rows and expansion targets for a whole tree in one pass.
    pub fn evaluate(&self, roots: &[TreeRow]) -> Visibility {
        let mut visibility = Visibility::default();
        let mut prefix = Vec::new();
        self.collect(roots, &mut prefix, &mut visibility);
        visibility
    }

    fn collect(&self, rows: &[TreeRow], prefix: &mut RowPath, out: &mut Visibility) -> bool {
        let mut any_visible = false;
        for (idx, row) in rows.iter().enumerate() {
            prefix.push(idx);
            let visible_mark = out.visible.len();
            let expand_mark = out.expand.len();
            out.visible.push(prefix.clone());
            out.expand.push(prefix.clone());

            let self_match = self.matches(row);
            let child_visible = self.collect(&row.children, prefix, out);

            if !child_visible {
                out.expand.remove(expand_mark);
            }
            if self_match || child_visible {
                any_visible = true;
            } else {
                out.visible.truncate(visible_mark);
            }
            prefix.pop();
        }
        any_visible
    }

    /// Paths of every visible row in pre-order.
    pub fn visible_paths(&self, roots: &[TreeRow]) -> Vec<RowPath> {
        self.evaluate(roots).visible
    }

    /// Rows to expand so every visible match can be seen.
    pub fn expansion_paths(&self, roots: &[TreeRow]) -> Vec<RowPath> {
        self.evaluate(roots).expand
    }

    /// Clone of the tree restricted to visible rows.
    pub fn prune(&self, roots: &[TreeRow]) -> Vec<TreeRow> {
        roots
            .iter()
            .filter_map(|row| {
                let children = self.prune(&row.children);
                if children.is_empty() && !self.matches(row) {
                    return None;
                }
                Some(TreeRow {
                    columns: row.columns.clone(),
                    children,
                })
            })
            .collect()
    }
}
