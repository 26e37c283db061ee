//! Reactions produced by the reaction oracle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::message::MessageVariant;
use super::participant::Participant;

/// Five-point Likert rating, mapped linearly onto [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikertRating {
    StronglyDisagree,
    Disagree,
    Neutral,
    Agree,
    StronglyAgree,
}

impl LikertRating {
    pub const ALL: [Self; 5] = [
        Self::StronglyDisagree,
        Self::Disagree,
        Self::Neutral,
        Self::Agree,
        Self::StronglyAgree,
    ];

    /// Score from 0.0 (strongly disagree) to 1.0 (strongly agree) in steps of 0.25.
    pub const fn score(self) -> f64 {
        match self {
            Self::StronglyDisagree => 0.0,
            Self::Disagree => 0.25,
            Self::Neutral => 0.5,
            Self::Agree => 0.75,
            Self::StronglyAgree => 1.0,
        }
    }
}

impl fmt::Display for LikertRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StronglyDisagree => "strongly disagree",
            Self::Disagree => "disagree",
            Self::Neutral => "neutral",
            Self::Agree => "agree",
            Self::StronglyAgree => "strongly agree",
        };
        f.write_str(s)
    }
}

/// Structured reaction of one participant to one wording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Things that resonate about the message
    pub positives: String,
    /// Things that backfire about the message
    pub negatives: String,
    /// Quotes saying how this message makes the participant feel
    #[serde(default)]
    pub quotes: Vec<String>,
    pub rating: LikertRating,
}

impl Reaction {
    pub fn rated(rating: LikertRating) -> Self {
        Self {
            positives: String::new(),
            negatives: String::new(),
            quotes: Vec::new(),
            rating,
        }
    }
}

/// A participant paired with a message variant: the atomic unit of work.
#[derive(Debug, Clone)]
pub struct ParticipantMessagePresentation {
    pub participant: Arc<dyn Participant>,
    pub message_variant: MessageVariant,
}

impl ParticipantMessagePresentation {
    pub fn new(participant: Arc<dyn Participant>, message_variant: MessageVariant) -> Self {
        Self {
            participant,
            message_variant,
        }
    }

    /// Identity of this combination within a run.
    pub fn key(&self) -> CombinationKey {
        CombinationKey {
            participant_id: self.participant.id().to_string(),
            message_id: self.message_variant.message.id.clone(),
            wording: self.message_variant.wording.clone(),
        }
    }
}

/// Hashable identity of a (participant, variant) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinationKey {
    pub participant_id: String,
    pub message_id: String,
    pub wording: String,
}

/// Reaction of one participant to a given message variant.
#[derive(Debug, Clone)]
pub struct SpecificReaction {
    pub presentation: ParticipantMessagePresentation,
    pub reaction: Reaction,
    pub timestamp: DateTime<Utc>,
}

impl SpecificReaction {
    pub fn new(presentation: ParticipantMessagePresentation, reaction: Reaction) -> Self {
        Self {
            presentation,
            reaction,
            timestamp: Utc::now(),
        }
    }

    pub fn score(&self) -> f64 {
        self.reaction.rating.score()
    }
}
