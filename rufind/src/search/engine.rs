//! Concurrent traversal-and-match engine.
//!
//! Architecture:
//! ```text
//! Walker job (single-threaded directory listing)
//! │
//! │  candidate channel (bounded)
//! ▼
//! ├── Matcher worker 0: recv path → match name → scan content → send record
//! ├── Matcher worker 1: ...
//! └── Matcher worker N: ...
//! │
//! │  record channel (bounded)
//! ▼
//! MatchStream (lazily pulled by the consumer)
//! ```
//!
//! Records arrive in completion order; no ordering is guaranteed between
//! them. Dropping the stream abandons the search: the walker and workers
//! observe a shared shutdown flag (or a disconnected channel) and stop
//! dispatching work without waiting for the traversal to finish.

use crossbeam_channel::{bounded, Receiver};
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::config::SearchRequest;
use crate::errors::{SearchError, SearchResult};
use crate::matcher::Matcher;
use crate::results::MatchRecord;
use crate::walker::walk;

// Bounds keep memory flat on huge trees: the walker stalls once workers
// fall behind, and workers stall once the consumer falls behind.
const CANDIDATE_QUEUE_CAPACITY: usize = 1024;
const RECORD_QUEUE_CAPACITY: usize = 256;

/// Coordinates the tree walker and a pool of matcher workers.
///
/// The engine is stateless across calls: every [`search`](Self::search) is
/// an independent traversal with its own channels and shutdown flag, so the
/// same engine can serve many queries (the interactive session issues one
/// per keystroke-confirmed query).
pub struct SearchEngine {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl SearchEngine {
    /// Creates an engine with the given number of matcher workers.
    ///
    /// The underlying pool reserves one extra thread for the walker, which
    /// runs single-threaded as the producer.
    pub fn new(workers: NonZeroUsize) -> SearchResult<Self> {
        let workers = workers.get();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers + 1)
            .thread_name(|i| format!("rufind-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(e.to_string()))?;
        debug!("Search pool sized at {} matcher workers", workers);
        Ok(Self { pool, workers })
    }

    /// Starts a search and returns the lazily consumed result stream.
    ///
    /// Fails fast, before any traversal, if the root does not exist or is
    /// not a directory, or if a pattern does not compile. Everything after
    /// that point is best effort: per-candidate failures are absorbed as
    /// non-matches.
    pub fn search(&self, request: &SearchRequest) -> SearchResult<MatchStream> {
        let metadata = fs::metadata(&request.root)
            .map_err(|e| SearchError::invalid_root(&request.root, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(SearchError::invalid_root(&request.root, "not a directory"));
        }
        // Listing the root is the one traversal failure that is fatal
        fs::read_dir(&request.root)
            .map_err(|e| SearchError::invalid_root(&request.root, e.to_string()))?;

        let matcher = Arc::new(Matcher::new(request)?);
        info!(
            "Starting search for '{}' under {}",
            request.name_pattern,
            request.root.display()
        );

        let (candidate_tx, candidate_rx) = bounded::<PathBuf>(CANDIDATE_QUEUE_CAPACITY);
        let (record_tx, record_rx) = bounded::<MatchRecord>(RECORD_QUEUE_CAPACITY);
        let done = Arc::new(AtomicBool::new(false));

        let root = request.root.clone();
        let ignore_dirs = request.ignore_dirs.clone();
        let walker_done = Arc::clone(&done);
        self.pool.spawn(move || {
            for path in walk(&root, &ignore_dirs) {
                if walker_done.load(Ordering::Relaxed) {
                    break;
                }
                // A send failure means every worker has exited
                if candidate_tx.send(path).is_err() {
                    break;
                }
            }
            trace!("Walker finished");
        });

        for id in 0..self.workers {
            let candidate_rx = candidate_rx.clone();
            let record_tx = record_tx.clone();
            let matcher = Arc::clone(&matcher);
            let worker_done = Arc::clone(&done);
            self.pool.spawn(move || {
                while let Ok(path) = candidate_rx.recv() {
                    if worker_done.load(Ordering::Relaxed) {
                        break;
                    }
                    if let Some(record) = matcher.match_file(&path) {
                        if record_tx.send(record).is_err() {
                            // Consumer went away: tell everyone else
                            worker_done.store(true, Ordering::Relaxed);
                            break;
                        }
                    }
                }
                trace!("Matcher worker {} finished", id);
            });
        }

        // The clones held by the jobs are now the only senders/receivers;
        // once they all exit, the stream's recv() reports completion.
        Ok(MatchStream {
            records: record_rx,
            done,
        })
    }
}

/// Lazy, finite stream of [`MatchRecord`]s in completion order.
///
/// Pull with the `Iterator` API; `None` means the traversal completed and
/// every qualifying candidate has been reported. Dropping the stream early
/// abandons the search and winds down the producing jobs.
#[derive(Debug)]
pub struct MatchStream {
    records: Receiver<MatchRecord>,
    done: Arc<AtomicBool>,
}

impl Iterator for MatchStream {
    type Item = MatchRecord;

    fn next(&mut self) -> Option<MatchRecord> {
        self.records.recv().ok()
    }
}

impl Drop for MatchStream {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
    }
}
