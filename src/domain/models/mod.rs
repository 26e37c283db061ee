pub mod best_variants;
pub mod config;
pub mod focus_group_run;
pub mod message;
pub mod participant;
pub mod reaction;
pub mod scoring;

pub use best_variants::BestScoringVariants;
pub use config::{
    Config, CreativePersona, DataConfig, FocusConfig, LlmConfig, LoggingConfig, RetryConfig,
};
pub use focus_group_run::{expand_combinations, FocusGroupRun};
pub use message::{Message, MessageVariant, MessageVariants, Positioning};
pub use participant::{
    FocusGroup, LlmOptions, Participant, ProfiledParticipant, PromptedParticipant,
};
pub use reaction::{
    CombinationKey, LikertRating, ParticipantMessagePresentation, Reaction, SpecificReaction,
};
pub use scoring::{
    best_performing_variant, decision_score, score_variant, scored_variants, MessageVariantScore,
    ScoreSummary,
};
