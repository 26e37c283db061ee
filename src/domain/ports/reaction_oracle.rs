//! Reaction oracle port: given a persona and a wording, produce a reaction.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::OracleError;
use crate::domain::models::{LlmOptions, ParticipantMessagePresentation, Reaction};

/// Everything the oracle needs to react to one combination.
#[derive(Debug, Clone, Serialize)]
pub struct ReactionRequest {
    pub participant_id: String,
    pub participant_name: String,
    /// Persona text of the participant
    pub persona: String,
    pub llm: LlmOptions,
    pub wording: String,
    pub objective: String,
    pub deliverable: String,
}

impl ReactionRequest {
    pub fn for_presentation(presentation: &ParticipantMessagePresentation) -> Self {
        let participant = &presentation.participant;
        let variant = &presentation.message_variant;
        Self {
            participant_id: participant.id().to_string(),
            participant_name: participant.name().to_string(),
            persona: participant.contribution(),
            llm: participant.llm().clone(),
            wording: variant.wording.clone(),
            objective: variant.message.objective.clone(),
            deliverable: variant.message.deliverable.clone(),
        }
    }
}

/// Opaque judgment of a participant's reaction.
///
/// Implementations own their timeout policy. Retries belong in a decorator
/// so the dispatcher stays unaware of them.
#[async_trait]
pub trait ReactionOracle: Send + Sync {
    async fn evaluate(&self, request: &ReactionRequest) -> Result<Reaction, OracleError>;
}
