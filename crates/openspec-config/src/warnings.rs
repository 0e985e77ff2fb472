//! Deduplicating warning collector
//!
//! Owned by the caller for the duration of one command. A message is logged
//! through `tracing` and recorded the first time it is seen; repeats are
//! dropped.

use std::collections::HashSet;
use tracing::warn;

/// Non-fatal diagnostics gathered during one invocation
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    seen: HashSet<String>,
    messages: Vec<String>,
}

impl Warnings {
    /// Create empty collector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning; returns `false` if it was already recorded
    pub fn warn(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.seen.contains(&message) {
            return false;
        }
        warn!("{message}");
        self.seen.insert(message.clone());
        self.messages.push(message);
        true
    }

    /// Recorded messages in first-seen order
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Number of distinct warnings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether any recorded message contains `needle`
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}
