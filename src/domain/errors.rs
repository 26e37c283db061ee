//! Domain errors for the Grouper focus group system.

use thiserror::Error;

/// Failure of a reaction or creative oracle call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Malformed oracle output: {0}")]
    Malformed(String),

    #[error("Oracle not configured: {0}")]
    NotConfigured(String),
}

impl OracleError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RateLimited(_))
    }
}

/// Domain-level errors that can occur in a focus group session.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Duplicate participant id in focus group: {0}")]
    DuplicateParticipant(String),

    #[error("Invalid population weight {weight} for participant {participant_id}")]
    InvalidWeight { participant_id: String, weight: f64 },

    #[error("Reaction oracle failed for participant {participant_id} on \"{wording}\": {source}")]
    ReactionFailed {
        participant_id: String,
        wording: String,
        #[source]
        source: OracleError,
    },

    #[error("Creative oracle failed: {0}")]
    CreativeFailed(#[source] OracleError),

    #[error("Evolution produced no wordings for message {0}")]
    EmptyEvolution(String),

    #[error("Combination is not part of this run: participant {participant_id}, wording \"{wording}\"")]
    UnknownCombination { participant_id: String, wording: String },

    #[error("Reaction already recorded for participant {participant_id}, wording \"{wording}\"")]
    DuplicateReaction { participant_id: String, wording: String },

    #[error("Dispatch worker failed: {0}")]
    WorkerFailed(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        DomainError::Repository(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Repository(err.to_string())
    }
}
