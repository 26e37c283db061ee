//! One iteration's execution state.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;
use uuid::Uuid;

use super::message::{MessageVariant, Positioning};
use super::participant::{FocusGroup, Participant};
use super::reaction::{CombinationKey, ParticipantMessagePresentation, SpecificReaction};
use super::scoring::{score_variant, MessageVariantScore};
use crate::domain::errors::{DomainError, DomainResult};

/// Cartesian product of every variant in `positioning` with every participant.
///
/// Variants are flattened first, then crossed with participants, so the output
/// is ordered variant-major.
pub fn expand_combinations(
    focus_group: &FocusGroup,
    positioning: &Positioning,
) -> Vec<ParticipantMessagePresentation> {
    positioning
        .variants()
        .flat_map(|variant| {
            focus_group.participants().iter().map(move |participant| {
                ParticipantMessagePresentation::new(participant.clone(), variant.clone())
            })
        })
        .collect()
}

/// Built up as results come back from the reaction oracle.
#[derive(Debug, Clone)]
pub struct FocusGroupRun {
    pub id: Uuid,
    pub focus_group: FocusGroup,
    pub positioning: Positioning,
    pub started_at: DateTime<Utc>,
    combinations: Vec<ParticipantMessagePresentation>,
    expected: HashSet<CombinationKey>,
    recorded: HashSet<CombinationKey>,
    specific_reactions: Vec<SpecificReaction>,
}

impl FocusGroupRun {
    /// Combinations are computed once here. A wording repeated within one
    /// message yields a single combination per participant.
    pub fn new(focus_group: FocusGroup, positioning: Positioning) -> Self {
        let mut expected = HashSet::new();
        let combinations: Vec<ParticipantMessagePresentation> =
            expand_combinations(&focus_group, &positioning)
                .into_iter()
                .filter(|c| expected.insert(c.key()))
                .collect();
        Self {
            id: Uuid::new_v4(),
            focus_group,
            positioning,
            started_at: Utc::now(),
            combinations,
            expected,
            recorded: HashSet::new(),
            specific_reactions: Vec::new(),
        }
    }

    pub fn combinations(&self) -> &[ParticipantMessagePresentation] {
        &self.combinations
    }

    /// Combinations that have no recorded reaction yet, in combination order.
    pub fn pending_combinations(&self) -> Vec<ParticipantMessagePresentation> {
        self.combinations
            .iter()
            .filter(|c| !self.recorded.contains(&c.key()))
            .cloned()
            .collect()
    }

    pub fn specific_reactions(&self) -> &[SpecificReaction] {
        &self.specific_reactions
    }

    /// True once every combination has exactly one recorded reaction.
    pub fn is_complete(&self) -> bool {
        !self.expected.is_empty() && self.recorded.len() == self.expected.len()
    }

    /// Record a completed evaluation.
    ///
    /// Reactions for combinations outside this run, or for combinations that
    /// already have a reaction, are rejected and not stored.
    pub fn record(&mut self, reaction: SpecificReaction) -> DomainResult<()> {
        let key = reaction.presentation.key();
        if !self.expected.contains(&key) {
            return Err(DomainError::UnknownCombination {
                participant_id: key.participant_id,
                wording: key.wording,
            });
        }
        if self.recorded.contains(&key) {
            return Err(DomainError::DuplicateReaction {
                participant_id: key.participant_id,
                wording: key.wording,
            });
        }
        self.recorded.insert(key);
        self.specific_reactions.push(reaction);
        Ok(())
    }

    pub fn reactions_for_variant<'a>(
        &'a self,
        variant: &'a MessageVariant,
    ) -> impl Iterator<Item = &'a SpecificReaction> + 'a {
        self.specific_reactions
            .iter()
            .filter(move |r| &r.presentation.message_variant == variant)
    }

    pub fn reactions_for_participant<'a>(
        &'a self,
        participant: &'a dyn Participant,
    ) -> impl Iterator<Item = &'a SpecificReaction> + 'a {
        self.specific_reactions
            .iter()
            .filter(move |r| r.presentation.participant.id() == participant.id())
    }

    pub fn average_score_for_participant(&self, participant: &dyn Participant) -> f64 {
        let (sum, count) = self
            .reactions_for_participant(participant)
            .fold((0.0, 0usize), |(s, c), r| (s + r.score(), c + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Human-readable results, used as feedback for the creative oracle.
    pub fn info_string(&self, verbose: bool, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = String::new();

        let _ = writeln!(out, "{pad}Focus Group Results");
        let _ = writeln!(out, "{pad}===================\n");

        let mut scores: Vec<MessageVariantScore> = self
            .positioning
            .variants()
            .map(|v| score_variant(self, v))
            .collect();
        scores.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));

        let _ = writeln!(out, "{pad}Message Ranking by Effectiveness:");
        let _ = writeln!(out, "{pad}---------------------------------");
        for (rank, score) in scores.iter().enumerate() {
            let _ = writeln!(
                out,
                "{pad}{}. {:.2} - {} (id: {})",
                rank + 1,
                score.average_score,
                truncate_wording(&score.message_variant.wording, 60),
                score.message_variant.message.id
            );
        }
        out.push('\n');

        let _ = writeln!(out, "{pad}Detailed Results:");
        let _ = writeln!(out, "{pad}-----------------\n");
        for score in &scores {
            let variant = &score.message_variant;
            let _ = writeln!(
                out,
                "{pad}Message: {} (ID: {})",
                variant.message.content, variant.message.id
            );
            let _ = writeln!(out, "{pad}Objective: {}", variant.message.objective);
            let _ = writeln!(out, "{pad}Expression: {}", variant.wording);
            let _ = writeln!(
                out,
                "{pad}Average Score: {:.2} (weighted {:.2}) - {} reactions",
                score.average_score, score.normalized_score, score.count
            );

            if verbose {
                let _ = writeln!(out, "{pad}  Participant Reactions:");
                for r in self.reactions_for_variant(variant) {
                    let s = r.score();
                    let _ = writeln!(
                        out,
                        "{pad}    {}: {:.2} ({:.0}%)",
                        r.presentation.participant.name(),
                        s,
                        s * 100.0
                    );
                    let _ = writeln!(out, "{pad}      Positives: {}", r.reaction.positives);
                    let _ = writeln!(out, "{pad}      Negatives: {}", r.reaction.negatives);
                    if !r.reaction.quotes.is_empty() {
                        let _ = writeln!(out, "{pad}      Quotes:");
                        for quote in &r.reaction.quotes {
                            let _ = writeln!(out, "{pad}        - \"{quote}\"");
                        }
                    }
                }
            }
            out.push('\n');
        }

        out
    }
}

impl fmt::Display for FocusGroupRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info_string(false, 0))
    }
}

fn truncate_wording(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
