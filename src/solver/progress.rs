//! Best-effort progress observability, shared across search tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

/// Take the lock once every this many observations.
const SAMPLE_INTERVAL: u64 = 1024;

/// Tracks the best number of clauses any explored partial state has
/// satisfied so far, across every task of one run.
///
/// The tracker is advisory only: it never influences the search outcome or
/// termination. Updates are sampled so the hot recursion does not contend on
/// the lock at every branch.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    observations: AtomicU64,
    best_depth: Mutex<usize>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a partial state has `depth` clauses satisfied. Most
    /// calls return after one atomic increment.
    pub fn observe(&self, depth: usize) {
        let n = self.observations.fetch_add(1, Ordering::Relaxed);
        if n % SAMPLE_INTERVAL != 0 {
            return;
        }
        let mut best = match self.best_depth.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if depth > *best {
            *best = depth;
            debug!(clauses_satisfied = depth, "new best partial state");
        }
    }

    pub fn best_depth(&self) -> usize {
        match self.best_depth.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
