//! Port trait definitions (Hexagonal Architecture)
//!
//! Interfaces the services drive and adapters implement:
//! - ReactionOracle: one participant's reaction to one wording
//! - CreativeOracle: new wordings from focus group feedback
//! - ProgressSink: side-channel dispatch progress
//! - ParticipantRepository / MessageVariantsRepository: session inputs

pub mod creative_oracle;
pub mod message_repository;
pub mod participant_repository;
pub mod progress;
pub mod reaction_oracle;

pub use creative_oracle::{CreativeOracle, NewMessageWordings, RewriteRequest};
pub use message_repository::MessageVariantsRepository;
pub use participant_repository::ParticipantRepository;
pub use progress::{NoopProgress, ProgressSink, TracingProgress};
pub use reaction_oracle::{ReactionOracle, ReactionRequest};
