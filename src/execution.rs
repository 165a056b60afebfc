// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! How the data-parallel stages get their work done.
//!
//! Every parallel stage in the carver has the same shape: a flat
//! output buffer that can be broken up with `chunks_mut` into
//! disjoint pieces (a row of the energy map, a span of columns of one
//! row of the cost table, a row of the narrowed image), each of which
//! is filled from read-only input.  Because each piece is handed out
//! exactly once, no worker can ever write where another one does, and
//! none of this needs `unsafe`.
//!
//! In parallel mode the pieces are spread over a rayon thread pool
//! with `par_chunks_mut`.  The pool for a given worker count is built
//! the first time it is asked for and then kept for the life of the
//! process, so a stage that runs once per row of the cost table costs
//! a fork-join on threads that already exist, not a round of thread
//! spawning.  `for_each_chunk` returns only once every piece is
//! written, which is the join barrier between rows and stages.

use log::{trace, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::{Arc, Mutex};

// One pool per worker count asked for, kept until exit.
static POOLS: Mutex<Vec<(usize, Arc<ThreadPool>)>> = Mutex::new(Vec::new());

fn pool(workers: usize) -> Option<Arc<ThreadPool>> {
    let mut pools = POOLS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some((_, pool)) = pools.iter().find(|(count, _)| *count == workers) {
        return Some(Arc::clone(pool));
    }

    match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("pngseam-worker-{}", i))
        .build()
    {
        Ok(pool) => {
            trace!("started a pool of {} workers", workers);
            let pool = Arc::new(pool);
            pools.push((workers, Arc::clone(&pool)));
            Some(pool)
        }
        Err(e) => {
            warn!("could not start {} workers ({}); running on one thread", workers, e);
            None
        }
    }
}

/// The execution policy for the data-parallel stages.  Both variants
/// produce byte-identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Everything runs on the calling thread.
    Sequential,
    /// Fork-join over a fixed pool of `workers` threads.
    Parallel { workers: usize },
}

impl Default for Execution {
    fn default() -> Self {
        Execution::Sequential
    }
}

impl Execution {
    /// Parallel execution with one worker per logical CPU.
    pub fn parallel() -> Self {
        Execution::Parallel {
            workers: num_cpus::get().max(1),
        }
    }

    /// Parallel execution with an explicit worker count.  A count of
    /// zero is treated as one.
    pub fn with_workers(workers: usize) -> Self {
        Execution::Parallel {
            workers: workers.max(1),
        }
    }

    /// The number of threads this policy will put on a stage.
    pub fn workers(&self) -> usize {
        match *self {
            Execution::Sequential => 1,
            Execution::Parallel { workers } => workers.max(1),
        }
    }

    /// The chunk length that splits `len` items into at most one
    /// chunk per worker.
    pub fn span(&self, len: usize) -> usize {
        let workers = self.workers();
        ((len + workers - 1) / workers).max(1)
    }

    /// Break `data` into consecutive chunks of `chunk_len` items (the
    /// last one may be shorter) and call `f(chunk_index, chunk)` once
    /// for each.  Returns only after every chunk has been processed.
    /// A panic in `f` is raised again on the caller.
    pub fn for_each_chunk<T, F>(&self, data: &mut [T], chunk_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if data.is_empty() || chunk_len == 0 {
            return;
        }

        let chunks = (data.len() + chunk_len - 1) / chunk_len;
        let pool = match self.workers().min(chunks) {
            0 | 1 => None,
            _ => pool(self.workers()),
        };

        match pool {
            Some(pool) => pool.install(|| {
                data.par_chunks_mut(chunk_len)
                    .enumerate()
                    .for_each(|(index, chunk)| f(index, chunk))
            }),
            None => data
                .chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(index, chunk)| f(index, chunk)),
        }
    }
}
