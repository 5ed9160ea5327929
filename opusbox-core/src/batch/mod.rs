//! Batch Coordinator: fan N independent store operations out across
//! concurrent tasks and fan their results back in.
//!
//! Policy:
//! - one tokio task per key, no concurrency bound (N tasks for N items);
//! - one advisory, one-shot cancellation signal per batch: the first
//!   failing unit trips it, units that have not started their store call
//!   observe it and report [`ItemOutcome::Skipped`] without doing work,
//!   in-flight I/O is never aborted;
//! - fan-in over a single mpsc channel; every task owns a sender clone, so
//!   the receiver closes exactly when the last unit has reported. That is
//!   the join barrier; no straggler can race the collector;
//! - an optional deadline arms a timer around the drain; on expiry it trips
//!   the same cancellation signal and draining continues until every unit
//!   has reported.
//!
//! The coordinator never drops outcomes: the report covers every submitted
//! key, succeeded, failed, or skipped.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{BatchReport, ItemOutcome};

/// Tuning knobs for one coordinator instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Wall-clock bound on the whole batch. When it elapses the batch is
    /// cancelled (advisory: in-flight units still run to completion) and the
    /// report's `deadline_hit` flag is set. `None` disables the timer.
    pub deadline: Option<Duration>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchCoordinator {
    options: BatchOptions,
}

impl BatchCoordinator {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    /// Run every unit concurrently and collect one outcome per key.
    ///
    /// Futures are lazy, so a unit that observes cancellation before its
    /// first poll has performed no work at all. `K` is the caller's
    /// correlation handle (label or object key); the report comes back in
    /// completion order.
    pub async fn run<K, T, Fut>(&self, units: Vec<(K, Fut)>) -> BatchReport<K, T>
    where
        K: fmt::Display + Send + 'static,
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let total = units.len();
        let token = CancellationToken::new();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

        for (key, unit) in units {
            let token = token.clone();
            let tx = outcome_tx.clone();
            tokio::spawn(async move {
                let outcome = if token.is_cancelled() {
                    debug!(key = %key, "unit preempted by batch cancellation");
                    ItemOutcome::Skipped
                } else {
                    match unit.await {
                        Ok(value) => ItemOutcome::Succeeded(value),
                        Err(cause) => {
                            warn!(key = %key, error = %cause, "unit failed, cancelling batch");
                            token.cancel();
                            ItemOutcome::Failed(cause)
                        }
                    }
                };
                // Send only fails if the collector gave up, which it never
                // does: it drains until this channel closes.
                let _ = tx.send((key, outcome));
            });
        }
        // The collector must not hold the channel open itself.
        drop(outcome_tx);

        let mut outcomes = Vec::with_capacity(total);
        let mut deadline_hit = false;

        match self.options.deadline {
            Some(limit) => {
                let timer = tokio::time::sleep(limit);
                tokio::pin!(timer);
                loop {
                    tokio::select! {
                        received = outcome_rx.recv() => match received {
                            Some(entry) => outcomes.push(entry),
                            None => break,
                        },
                        _ = &mut timer, if !deadline_hit => {
                            warn!(
                                deadline_ms = limit.as_millis() as u64,
                                reported = outcomes.len(),
                                total,
                                "batch deadline elapsed, cancelling remaining units"
                            );
                            deadline_hit = true;
                            token.cancel();
                        }
                    }
                }
            }
            None => {
                while let Some(entry) = outcome_rx.recv().await {
                    outcomes.push(entry);
                }
            }
        }

        debug_assert_eq!(outcomes.len(), total);
        BatchReport::new(outcomes, deadline_hit)
    }
}
