//! Scoring of message variants from recorded reactions.
//!
//! Two averages are kept per variant: the raw mean over all reactions, and a
//! population-weighted mean that re-normalizes over the participants who
//! actually reacted. Ranking and the stop criterion use a fixed blend of the
//! two (`decision_score`), so a message hated by a small but heavily weighted
//! slice of the population is penalized without the raw mean being ignored.

use serde::Serialize;

use super::focus_group_run::FocusGroupRun;
use super::message::MessageVariant;

/// Weight of the normalized score in the decision blend.
pub const NORMALIZED_SCORE_WEIGHT: f64 = 5.0;

/// Weight of the raw average score in the decision blend.
pub const AVERAGE_SCORE_WEIGHT: f64 = 1.1;

/// Aggregate over all reactions recorded for one variant.
#[derive(Debug, Clone)]
pub struct MessageVariantScore {
    pub message_variant: MessageVariant,
    pub average_score: f64,
    pub normalized_score: f64,
    pub count: usize,
}

impl MessageVariantScore {
    pub fn empty(message_variant: MessageVariant) -> Self {
        Self {
            message_variant,
            average_score: 0.0,
            normalized_score: 0.0,
            count: 0,
        }
    }

    pub fn decision_score(&self) -> f64 {
        decision_score(self)
    }
}

/// Serializable snapshot of a score, for reports.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub message_id: String,
    pub wording: String,
    pub average_score: f64,
    pub normalized_score: f64,
    pub decision_score: f64,
    pub count: usize,
}

impl From<&MessageVariantScore> for ScoreSummary {
    fn from(score: &MessageVariantScore) -> Self {
        Self {
            message_id: score.message_variant.message.id.clone(),
            wording: score.message_variant.wording.clone(),
            average_score: score.average_score,
            normalized_score: score.normalized_score,
            decision_score: score.decision_score(),
            count: score.count,
        }
    }
}

/// Blend of normalized and raw average used for ranking and convergence.
pub fn decision_score(score: &MessageVariantScore) -> f64 {
    (score.normalized_score * NORMALIZED_SCORE_WEIGHT + score.average_score * AVERAGE_SCORE_WEIGHT)
        / (NORMALIZED_SCORE_WEIGHT + AVERAGE_SCORE_WEIGHT)
}

/// Score one variant over the reactions recorded so far.
///
/// A variant with no reactions scores zero on every axis.
pub fn score_variant(run: &FocusGroupRun, variant: &MessageVariant) -> MessageVariantScore {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for reaction in run.reactions_for_variant(variant) {
        let score = reaction.score();
        let weight = run
            .focus_group
            .normalized_weight(reaction.presentation.participant.as_ref());
        count += 1;
        sum += score;
        weighted_sum += score * weight;
        total_weight += weight;
    }

    if count == 0 {
        return MessageVariantScore::empty(variant.clone());
    }

    let normalized_score = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };

    MessageVariantScore {
        message_variant: variant.clone(),
        average_score: sum / count as f64,
        normalized_score,
        count,
    }
}

/// Scores for every variant of the run's positioning that has reactions.
pub fn scored_variants(run: &FocusGroupRun) -> Vec<MessageVariantScore> {
    run.positioning
        .variants()
        .map(|v| score_variant(run, v))
        .filter(|s| s.count > 0)
        .collect()
}

/// The reacted-to variant with the highest normalized score.
///
/// Ties go to the variant that comes first in positioning order. Returns
/// `None` until at least one reaction has been recorded.
pub fn best_performing_variant(run: &FocusGroupRun) -> Option<MessageVariantScore> {
    let mut best: Option<MessageVariantScore> = None;
    for score in scored_variants(run) {
        let better = match &best {
            Some(current) => score.normalized_score > current.normalized_score,
            None => true,
        };
        if better {
            best = Some(score);
        }
    }
    best
}
