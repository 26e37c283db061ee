//! Session state machine: dispatch, aggregate, check, evolve.
//!
//! ```text
//! Init -> Dispatch -> Aggregate -> Check -> Terminate
//!            ^                       |
//!            +------- Evolve <-------+
//! ```
//!
//! Iterations are strictly sequential. Each dispatch works on a fresh
//! [`FocusGroupRun`]; only the [`BestScoringVariants`] accumulator and its
//! findings carry over between iterations.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    best_performing_variant, BestScoringVariants, FocusConfig, FocusGroup, FocusGroupRun,
    Positioning,
};

use super::evaluation_dispatcher::EvaluationDispatcher;
use super::evolution_step::EvolutionStep;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The best variant of a complete run beat the minimum score
    Acceptable { decision_score: f64 },
    /// The iteration budget ran out first
    IterationBudgetExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acceptable { decision_score } => {
                write!(f, "acceptable (decision score {decision_score:.2})")
            }
            Self::IterationBudgetExhausted => f.write_str("iteration budget exhausted"),
        }
    }
}

/// Result of a session. `best` is the primary result.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub best: BestScoringVariants,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub final_run: FocusGroupRun,
}

enum SessionState {
    Init(Positioning),
    Dispatch(Positioning),
    Aggregate(FocusGroupRun),
    Check(FocusGroupRun),
    Evolve(FocusGroupRun),
    Terminate(FocusGroupRun, StopReason),
}

impl SessionState {
    const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Dispatch(_) => "dispatch",
            Self::Aggregate(_) => "aggregate",
            Self::Check(_) => "check",
            Self::Evolve(_) => "evolve",
            Self::Terminate(..) => "terminate",
        }
    }
}

pub struct ConvergenceController {
    dispatcher: EvaluationDispatcher,
    evolution: EvolutionStep,
    max_iterations: usize,
    max_variants: usize,
    min_message_score: f64,
}

impl ConvergenceController {
    pub fn new(dispatcher: EvaluationDispatcher, evolution: EvolutionStep, focus: &FocusConfig) -> Self {
        Self {
            dispatcher,
            evolution,
            max_iterations: focus.max_iterations,
            max_variants: focus.max_variants,
            min_message_score: focus.min_message_score,
        }
    }

    /// Stop predicate, evaluated after every aggregation.
    ///
    /// The fitness test only counts for a complete run. When both criteria
    /// hold the session is reported as acceptable.
    pub fn check(&self, run: &FocusGroupRun, iterations: usize) -> Option<StopReason> {
        if run.is_complete() {
            if let Some(best) = best_performing_variant(run) {
                let decision_score = best.decision_score();
                if decision_score > self.min_message_score {
                    return Some(StopReason::Acceptable { decision_score });
                }
            }
        }
        if iterations >= self.max_iterations {
            return Some(StopReason::IterationBudgetExhausted);
        }
        None
    }

    /// Run a session to termination.
    #[instrument(skip_all, fields(participants = focus_group.len(), variants = positioning.variant_count()))]
    pub async fn run(
        &self,
        focus_group: FocusGroup,
        positioning: Positioning,
    ) -> DomainResult<SessionOutcome> {
        self.validate(&focus_group, &positioning)?;

        let session_id = Uuid::new_v4();
        let mut best = BestScoringVariants::new(self.max_variants);
        let mut iterations = 0usize;
        let mut state = SessionState::Init(positioning);

        info!(%session_id, max_iterations = self.max_iterations, "Session started");

        loop {
            debug!(state = state.name(), iteration = iterations, "Session transition");
            state = match state {
                SessionState::Init(positioning) => SessionState::Dispatch(positioning),
                SessionState::Dispatch(positioning) => {
                    let mut run = FocusGroupRun::new(focus_group.clone(), positioning);
                    self.dispatcher.dispatch(&mut run).await?;
                    iterations += 1;
                    SessionState::Aggregate(run)
                }
                SessionState::Aggregate(run) => {
                    best.update_from(&run);
                    SessionState::Check(run)
                }
                SessionState::Check(run) => match self.check(&run, iterations) {
                    Some(reason) => SessionState::Terminate(run, reason),
                    None => SessionState::Evolve(run),
                },
                SessionState::Evolve(run) => {
                    let next = self.evolution.evolve(&run, &mut best, iterations).await?;
                    SessionState::Dispatch(next)
                }
                SessionState::Terminate(final_run, stop_reason) => {
                    info!(
                        %session_id,
                        iterations,
                        stop_reason = %stop_reason,
                        retained = best.variants().len(),
                        "Session finished"
                    );
                    return Ok(SessionOutcome {
                        session_id,
                        best,
                        iterations,
                        stop_reason,
                        final_run,
                    });
                }
            };
        }
    }

    fn validate(&self, focus_group: &FocusGroup, positioning: &Positioning) -> DomainResult<()> {
        if focus_group.is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "focus group has no participants".to_string(),
            ));
        }
        if positioning.variant_count() == 0 {
            return Err(DomainError::InvalidConfiguration(
                "positioning has no wordings to test".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(DomainError::InvalidConfiguration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.max_variants == 0 {
            return Err(DomainError::InvalidConfiguration(
                "max_variants must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_message_score) {
            return Err(DomainError::InvalidConfiguration(format!(
                "min_message_score {} is outside [0, 1]",
                self.min_message_score
            )));
        }
        Ok(())
    }
}
