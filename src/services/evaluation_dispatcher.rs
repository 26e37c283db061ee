//! Evaluation dispatcher.
//!
//! Runs every pending combination of a [`FocusGroupRun`] through the
//! reaction oracle with at most `max_concurrency` calls in flight. Workers
//! never touch the run: results are collected behind a full barrier and then
//! recorded sequentially, in combination order. The first failure aborts the
//! remaining workers and nothing from the batch is recorded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{FocusGroupRun, SpecificReaction};
use crate::domain::ports::{NoopProgress, ProgressSink, ReactionOracle, ReactionRequest};

/// Label attached to dispatch progress notifications.
pub const PROGRESS_LABEL: &str = "focus";

pub struct EvaluationDispatcher {
    oracle: Arc<dyn ReactionOracle>,
    progress: Arc<dyn ProgressSink>,
    max_concurrency: usize,
}

impl EvaluationDispatcher {
    pub fn new(oracle: Arc<dyn ReactionOracle>, max_concurrency: usize) -> Self {
        Self {
            oracle,
            progress: Arc::new(NoopProgress),
            max_concurrency,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Evaluate every combination of `run` that has no reaction yet.
    ///
    /// Returns the number of reactions recorded.
    #[instrument(skip(self, run), fields(run_id = %run.id, max_concurrency = self.max_concurrency))]
    pub async fn dispatch(&self, run: &mut FocusGroupRun) -> DomainResult<usize> {
        if self.max_concurrency == 0 {
            return Err(DomainError::InvalidConfiguration(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        let pending = run.pending_combinations();
        let total = pending.len();
        if total == 0 {
            debug!("Nothing to dispatch");
            return Ok(0);
        }
        info!(combinations = total, "Will try {} combinations", total);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();

        for (index, presentation) in pending.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let oracle = Arc::clone(&self.oracle);
            let progress = Arc::clone(&self.progress);
            let completed = Arc::clone(&completed);

            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| DomainError::WorkerFailed(e.to_string()))?;

                let request = ReactionRequest::for_presentation(&presentation);
                let reaction = oracle.evaluate(&request).await.map_err(|source| {
                    DomainError::ReactionFailed {
                        participant_id: request.participant_id.clone(),
                        wording: request.wording.clone(),
                        source,
                    }
                })?;
                debug!(
                    participant_id = %request.participant_id,
                    rating = %reaction.rating,
                    "Reaction received"
                );

                let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress.on_progress(PROGRESS_LABEL, count, total);

                Ok::<_, DomainError>((index, SpecificReaction::new(presentation, reaction)))
            });
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = workers.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(DomainError::WorkerFailed(e.to_string())),
            };
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    workers.abort_all();
                    warn!(error = %err, "Dispatch failed, aborting remaining evaluations");
                    return Err(err);
                }
            }
        }

        results.sort_by_key(|(index, _)| *index);
        for (_, reaction) in results {
            run.record(reaction)?;
        }

        info!(recorded = total, complete = run.is_complete(), "Dispatch finished");
        Ok(total)
    }
}
