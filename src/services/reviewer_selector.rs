//! Randomized reviewer selection.
//!
//! Two modes share one injected [`RandomSource`]:
//! - shuffle-select: uniform permutation of the pool, then the first `k`
//! - single-draw: one uniformly chosen element

use std::sync::Arc;

use crate::domain::ports::RandomSource;

#[derive(Clone)]
pub struct ReviewerSelector {
    rng: Arc<dyn RandomSource>,
}

impl ReviewerSelector {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Shuffle `pool` in place (Fisher-Yates, from the end inward) and keep
    /// the first `min(k, pool.len())` entries.
    pub fn shuffle_select(&self, mut pool: Vec<String>, k: usize) -> Vec<String> {
        for i in (1..pool.len()).rev() {
            let j = self.rng.index(i + 1);
            pool.swap(i, j);
        }
        pool.truncate(k);
        pool
    }

    /// Pick one element uniformly at random; `None` for an empty pool.
    pub fn single_draw(&self, pool: &[String]) -> Option<String> {
        if pool.is_empty() {
            return None;
        }
        Some(pool[self.rng.index(pool.len())].clone())
    }
}

impl std::fmt::Debug for ReviewerSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerSelector").finish_non_exhaustive()
    }
}
