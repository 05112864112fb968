//! Running counters shared between a live game and its search clones

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Reporting-only statistics. Shared by reference, so clones of a
/// `GameState` all feed the same counters.
#[derive(Debug, Default)]
pub struct Stats {
    evaluations: Cell<u64>,
    evaluations_per_depth: RefCell<FxHashMap<u32, u64>>,
    search_time: Cell<Duration>,
    searches: Cell<u32>,
}

impl Stats {
    pub fn record_evaluation(&self) {
        self.evaluations.set(self.evaluations.get() + 1);
    }

    /// Count a leaf evaluation at `depth` plies below the search root
    pub fn record_depth(&self, depth: u32) {
        *self.evaluations_per_depth.borrow_mut().entry(depth).or_insert(0) += 1;
    }

    pub fn record_search(&self, elapsed: Duration) {
        self.search_time.set(self.search_time.get() + elapsed);
        self.searches.set(self.searches.get() + 1);
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    /// (depth, count) pairs sorted by depth
    pub fn evaluations_per_depth(&self) -> Vec<(u32, u64)> {
        let mut counts: Vec<_> = self
            .evaluations_per_depth
            .borrow()
            .iter()
            .map(|(&depth, &count)| (depth, count))
            .collect();
        counts.sort_unstable();
        counts
    }

    pub fn search_time(&self) -> Duration {
        self.search_time.get()
    }

    pub fn average_search_time(&self) -> Option<Duration> {
        match self.searches.get() {
            0 => None,
            n => Some(self.search_time.get() / n),
        }
    }
}
