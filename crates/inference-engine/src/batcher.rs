//! Batch Evaluation
//!
//! Large batches are split into contiguous chunks, each evaluated on a
//! scoped worker thread, and the chunk results re-joined in input order.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Batch evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Batches at or above this size are evaluated in parallel (default: 64)
    pub parallel_threshold: usize,
    /// Upper bound on worker threads (default: available parallelism)
    pub max_workers: usize,
    /// Largest accepted batch (default: 1000)
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 64,
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_batch_size: 1000,
        }
    }
}

impl BatchConfig {
    /// Chunk length for a batch of `len`, or `None` to stay on this thread
    fn chunk_len(&self, len: usize) -> Option<usize> {
        if self.max_workers <= 1 || len < self.parallel_threshold.max(2) {
            return None;
        }
        let workers = self.max_workers.min(len);
        Some(len.div_ceil(workers))
    }

    /// Map `f` over `items`, preserving order
    pub fn run<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let Some(chunk_len) = self.chunk_len(items.len()) else {
            return items.iter().map(&f).collect();
        };

        debug!(
            "Evaluating batch of {} in chunks of {}",
            items.len(),
            chunk_len
        );

        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = items
                .chunks(chunk_len)
                .map(|chunk| scope.spawn(move || chunk.iter().map(f).collect::<Vec<R>>()))
                .collect();

            let mut results = Vec::with_capacity(items.len());
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => results.extend(chunk),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            results
        })
    }
}
