//! Deduplicated, deferred warnings.
//!
//! Auto-corrections (an anchor name rewritten into a valid identifier, a link fragment
//! encoded, a cell dropped) are not fatal. They are collected per message key and logged
//! once when the owner drains them, unless verbose mode asks for them immediately.

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Default)]
pub struct Diagnostics {
    verbose: bool,
    pending: IndexMap<String, IndexSet<String>>,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            pending: IndexMap::new(),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Records a warning under `key`. Identical messages under one key are kept once.
    pub fn warn(&mut self, key: &str, message: impl Into<String>) {
        let message = message.into();
        if self.verbose {
            log::warn!("{message}");
            return;
        }
        self.pending
            .entry(key.to_string())
            .or_default()
            .insert(message);
    }

    /// Forget everything collected so far.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct pending messages.
    pub fn len(&self) -> usize {
        self.pending.values().map(IndexSet::len).sum()
    }

    pub fn messages(&self, key: &str) -> Vec<&str> {
        self.pending
            .get(key)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Logs every pending message once and clears the store.
    pub fn flush(&mut self) {
        for (key, messages) in self.pending.drain(..) {
            for message in messages {
                log::warn!("[{key}] {message}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_per_key() {
        let mut diagnostics = Diagnostics::new(false);
        diagnostics.warn("invalid-id", "Modified invalid anchor name 'a b'");
        diagnostics.warn("invalid-id", "Modified invalid anchor name 'a b'");
        diagnostics.warn("invalid-id", "Modified invalid anchor name '1x'");
        diagnostics.warn("link", "Modified invalid link fragment 'x y'");

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.messages("invalid-id").len(), 2);
    }

    #[test]
    fn flush_drains() {
        let mut diagnostics = Diagnostics::new(false);
        diagnostics.warn("k", "m");
        diagnostics.flush();
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn verbose_mode_does_not_defer() {
        let mut diagnostics = Diagnostics::new(true);
        diagnostics.warn("k", "m");
        assert!(diagnostics.is_empty());
    }
}
