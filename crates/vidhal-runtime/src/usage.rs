//! Usage counters for a run.
//!
//! Counters are shared by every worker of a run, so they are plain atomics
//! and reading them never blocks a model call.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of what a run consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUsage {
    /// Items finished
    pub items: u64,

    /// Number of model calls made
    pub model_calls: u64,

    /// Answers the parser could not fully resolve
    pub unparsed_answers: u64,
}

/// Live counters shared across workers.
#[derive(Debug, Default)]
pub struct UsageTracker {
    items: AtomicU64,
    model_calls: AtomicU64,
    unparsed_answers: AtomicU64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_item(&self) {
        self.items.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_call(&self) {
        self.model_calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Record an unmatched choice or an incomplete ordering.
    pub fn record_unparsed(&self) {
        self.unparsed_answers.fetch_add(1, Ordering::SeqCst);
    }

    /// Get current usage.
    pub fn snapshot(&self) -> RunUsage {
        RunUsage {
            items: self.items.load(Ordering::SeqCst),
            model_calls: self.model_calls.load(Ordering::SeqCst),
            unparsed_answers: self.unparsed_answers.load(Ordering::SeqCst),
        }
    }
}
