//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_AUTO_SAVE_INTERVAL_MS, DEFAULT_HISTORY_LIMIT, HISTORY_FILE_NAME};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for snipbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one JSON file per snippet.
    pub data_dir: PathBuf,
    /// Newline-delimited search keyword history.
    pub history_path: PathBuf,
    /// Autosave polling interval in milliseconds.
    pub auto_save_interval: u64,
    /// Maximum number of remembered search keywords.
    pub history_limit: usize,
    /// Start the tree search in regex mode.
    pub regex_search: bool,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_base_dir() -> PathBuf {
    resolve_home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("snipbook")
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let base = default_base_dir();
        Self {
            data_dir: env::var("SNIPBOOK_DATA_DIR")
                .map(expand_tilde)
                .unwrap_or_else(|_| base.join("data")),
            history_path: env::var("SNIPBOOK_HISTORY_FILE")
                .map(expand_tilde)
                .unwrap_or_else(|_| base.join(HISTORY_FILE_NAME)),
            auto_save_interval: env_number("SNIPBOOK_AUTOSAVE_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_AUTO_SAVE_INTERVAL_MS),
            history_limit: env_number("SNIPBOOK_HISTORY_LIMIT")
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_HISTORY_LIMIT),
            regex_search: env_flag_enabled("SNIPBOOK_REGEX_SEARCH"),
        }
    }

    /// Configuration rooted at `dir`, used by tests and the `--data-dir` flag.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        let history_path = data_dir
            .parent()
            .map(|parent| parent.join(HISTORY_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME));
        Self {
            data_dir,
            history_path,
            auto_save_interval: DEFAULT_AUTO_SAVE_INTERVAL_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            regex_search: false,
        }
    }

    /// Autosave interval as a [`Duration`].
    pub fn auto_save_delay(&self) -> Duration {
        Duration::from_millis(self.auto_save_interval)
    }
}
