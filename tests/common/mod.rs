//! Common test utilities for integration tests
//!
//! Shared fixtures: focus groups, positionings and session wiring.

#![allow(dead_code)]

use std::sync::Arc;

use grouper::adapters::oracles::{ScriptedCreativeOracle, ScriptedReactionOracle};
use grouper::domain::models::{
    FocusConfig, FocusGroup, LlmOptions, Message, MessageVariants, Participant, Positioning,
    PromptedParticipant,
};
use grouper::services::{ConvergenceController, EvaluationDispatcher, EvolutionStep};

/// Participant with the default model, so its id is `{name}-default`.
pub fn participant(name: &str, weight: f64) -> Arc<dyn Participant> {
    Arc::new(PromptedParticipant::new(
        name,
        LlmOptions::default(),
        format!("{name} is a teenager"),
        weight,
    ))
}

/// Focus group of equally weighted participants.
pub fn focus_group(names: &[&str]) -> FocusGroup {
    FocusGroup::new(names.iter().map(|n| participant(n, 1.0)).collect())
        .expect("fixture group is valid")
}

pub fn nosmoke() -> Arc<Message> {
    Arc::new(Message::new(
        "nosmoke",
        "Smoking is bad for you",
        "Persuade teenagers never to start smoking",
        "A poster slogan",
    ))
}

/// Positioning with the `nosmoke` message and the given wordings.
pub fn positioning(wordings: &[&str]) -> Positioning {
    Positioning::single(MessageVariants::new(nosmoke(), wordings.iter().copied()))
}

/// Controller wired to the given scripted oracles.
pub fn controller(
    reactions: Arc<ScriptedReactionOracle>,
    creative: Arc<ScriptedCreativeOracle>,
    focus: &FocusConfig,
) -> ConvergenceController {
    ConvergenceController::new(
        EvaluationDispatcher::new(reactions, focus.max_concurrency),
        EvolutionStep::from_config(creative, focus),
        focus,
    )
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
