//! Data models for persisted snippets.

/// Snippet record and kind types.
pub mod snippet;

#[cfg(test)]
mod tests;
