// src/scan/pool.rs
// =============================================================================
// This module runs the liveness check over every candidate concurrently.
//
// How it works:
// 1. Candidates are pulled one at a time from the input
// 2. Each one is evaluated in its own spawned tokio task (a "worker")
// 3. At most `workers` tasks run at the same time
// 4. Results come out in the order the tasks FINISH, not the input order
//
// Every candidate is owned by exactly one task, so the workers share
// nothing but the read-only probe. No locks needed.
//
// Cancellation:
// - Dropping the result stream aborts every task still in flight
// - scan_until() ends the stream when a shutdown future (e.g. Ctrl-C) fires
//
// Rust concepts:
// - Streams: async iterators, produced lazily as they are polled
// - buffer_unordered: run up to N futures at once, yield as they complete
// - Drop: code that runs when a value goes out of scope
// =============================================================================

use futures::future;
use futures::stream::{self, Stream, StreamExt};
use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

use crate::checker::{self, UrlProbe};
use crate::model::Candidate;

/// A spawned evaluation that is aborted if nobody waits for it anymore
struct Worker(JoinHandle<Candidate>);

impl Worker {
    fn spawn(probe: Arc<UrlProbe>, candidate: Candidate) -> Self {
        Worker(tokio::spawn(async move {
            checker::evaluate(&probe, candidate).await
        }))
    }
}

impl Future for Worker {
    type Output = Result<Candidate, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // JoinHandle is Unpin, so we can poll it through a plain &mut
        Pin::new(&mut self.0).poll(cx)
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // No-op if the task already finished
        self.0.abort();
    }
}

/// Runs liveness checks over a bounded pool of workers
pub struct Scanner {
    probe: Arc<UrlProbe>,
    workers: NonZeroUsize,
}

impl Scanner {
    pub fn new(probe: UrlProbe, workers: NonZeroUsize) -> Self {
        Self {
            probe: Arc::new(probe),
            workers,
        }
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Evaluates every candidate and yields each one as soon as it is done.
    ///
    /// The order of the results is the order in which evaluations finish.
    /// Callers must not assume it matches the input order.
    pub fn scan_all(&self, candidates: Vec<Candidate>) -> impl Stream<Item = Candidate> + Send + 'static {
        let probe = Arc::clone(&self.probe);
        debug!(count = candidates.len(), workers = self.workers.get(), "starting scan");

        stream::iter(candidates)
            .map(move |candidate| Worker::spawn(Arc::clone(&probe), candidate))
            .buffer_unordered(self.workers.get())
            .filter_map(|outcome| {
                future::ready(match outcome {
                    Ok(candidate) => Some(candidate),
                    Err(e) => {
                        // Only reachable if evaluation panicked
                        error!("worker failed: {}", e);
                        None
                    }
                })
            })
    }

    /// Same as scan_all(), but stops early once `shutdown` resolves.
    ///
    /// Candidates still being checked at that point are dropped and their
    /// tasks aborted.
    pub fn scan_until<F>(&self, candidates: Vec<Candidate>, shutdown: F) -> impl Stream<Item = Candidate> + Send + 'static
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.scan_all(candidates).take_until(shutdown)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why tokio::spawn instead of just buffer_unordered?
//    - buffer_unordered alone runs every future inside ONE task
//    - Spawning puts each evaluation on the runtime's thread pool,
//      so slow probes really do wait in parallel
//
// 2. Why wrap JoinHandle in Worker?
//    - Dropping a JoinHandle does NOT stop the task, it just detaches it
//    - Worker calls abort() in Drop, so a cancelled scan leaves nothing running
//
// 3. What is NonZeroUsize?
//    - A usize that can never be 0
//    - The CLI rejects 0 workers, so the scanner never has to check
// -----------------------------------------------------------------------------
