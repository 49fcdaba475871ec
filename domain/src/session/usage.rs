//! Token usage counters for a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of a session's token counters (Value Object)
///
/// `used` never decreases over a session's life and `limit` is fixed when
/// the session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub used: u64,
    pub limit: u64,
}

impl TokenUsage {
    pub fn new(used: u64, limit: u64) -> Self {
        Self { used, limit }
    }

    /// Tokens consumed so far.
    pub fn tokens_so_far(&self) -> u64 {
        self.used
    }

    /// Maximum tokens the session may hold.
    pub fn max_tokens(&self) -> u64 {
        self.limit
    }

    /// Tokens left before the limit is reached.
    pub fn tokens_left(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.tokens_left() == 0
    }

    /// Advance `used` to `observed`, ignoring values that would move it backwards.
    pub fn record(&mut self, observed: u64) {
        self.used = self.used.max(observed);
    }
}

impl fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({} left)",
            self.used,
            self.limit,
            self.tokens_left()
        )
    }
}
