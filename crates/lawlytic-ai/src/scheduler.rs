//! Concurrency scheduler: drives the batch analyzer over a whole document.
//!
//! Clauses are partitioned into fixed-size batches. Every batch becomes one
//! task; a counting gate admits at most `max_concurrency` of them at a time,
//! and each admitted task waits a pacing delay before calling the model so
//! requests spread across the provider's rate-limit window instead of
//! bursting. Results are concatenated in batch order, not completion order.
//!
//! All tasks are multiplexed on the caller's task (no `spawn`), so the only
//! suspension points are the pacing delay, the analyzer's backoff sleeps and
//! the gateway call itself.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use lawlytic_core::{ClauseAnalysis, defaults, partition};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::analyzer::BatchAnalyzer;
use crate::assembler::assemble;

/// Batching and admission settings for [`ClauseScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    pub max_concurrency: usize,
    /// Delay an admitted batch waits before calling the model.
    pub pacing: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::BATCH_SIZE,
            max_concurrency: defaults::MAX_CONCURRENCY,
            pacing: defaults::PACING,
        }
    }
}

/// Run `op` over `items` with at most `limit` operations in flight, returning
/// results in input order.
///
/// A permit is held for the whole of each operation and released on every
/// exit path when it drops. A `limit` of zero is treated as one.
pub async fn bounded_map<I, T, F, Fut>(items: I, limit: usize, op: F) -> Vec<Fut::Output>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future,
{
    let gate = Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS));
    let gate = &gate;
    let op = &op;

    join_all(items.into_iter().map(|item| async move {
        // Never closed, so this only ever waits for a free slot.
        let _permit = gate.acquire().await;
        op(item).await
    }))
    .await
}

/// Analyses every clause of a document through bounded, paced batches.
#[derive(Clone)]
pub struct ClauseScheduler {
    analyzer: BatchAnalyzer,
    config: SchedulerConfig,
}

impl ClauseScheduler {
    pub fn new(analyzer: BatchAnalyzer, config: SchedulerConfig) -> Self {
        Self { analyzer, config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Analyses for `clauses`, one per clause, in clause order.
    ///
    /// Never fails: batches the model could not handle come back as Gray
    /// fallback analyses. `original_text` is not filled in; see
    /// [`analyze_clauses`](Self::analyze_clauses).
    pub async fn run<S: AsRef<str>>(&self, clauses: &[S]) -> Vec<ClauseAnalysis> {
        let batches = partition(clauses, self.config.batch_size);
        info!(
            clauses = clauses.len(),
            batches = batches.len(),
            batch_size = self.config.batch_size,
            max_concurrency = self.config.max_concurrency,
            "analysing clauses"
        );

        let pacing = self.config.pacing;
        let per_batch = bounded_map(
            batches.into_iter().enumerate(),
            self.config.max_concurrency,
            |(index, batch)| async move {
                if !pacing.is_zero() {
                    tokio::time::sleep(pacing).await;
                }
                let analyses = self.analyzer.analyze(batch).await;
                debug!(batch = index, clauses = batch.len(), "batch complete");
                analyses
            },
        )
        .await;

        per_batch.into_iter().flatten().collect()
    }

    /// [`run`](Self::run) followed by [`assemble`], so every entry carries its
    /// clause text.
    pub async fn analyze_clauses<S: AsRef<str>>(&self, clauses: &[S]) -> Vec<ClauseAnalysis> {
        let analyses = self.run(clauses).await;
        assemble(clauses, &analyses)
    }
}
