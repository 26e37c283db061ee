//! Grouper - simulated focus groups for message wordings
//!
//! Grouper presents every wording of a message to every member of a
//! simulated focus group, scores the wordings from the weighted reactions,
//! and asks a creative oracle for better wordings until one is good enough
//! or the iteration budget runs out.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, scoring and the oracle/repository ports
//! - **Service Layer** (`services`): dispatch, evolution and the session loop
//! - **Adapters** (`adapters`): Messages API and scripted oracles, YAML repositories
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use grouper::services::{ConvergenceController, EvaluationDispatcher, EvolutionStep};
//!
//! let controller = ConvergenceController::new(dispatcher, evolution, &config.focus);
//! let outcome = controller.run(focus_group, positioning).await?;
//! println!("{}", outcome.best);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, OracleError};
pub use domain::models::{
    BestScoringVariants, Config, FocusGroup, FocusGroupRun, LikertRating, Message,
    MessageVariant, MessageVariantScore, MessageVariants, Positioning, Reaction,
};
pub use domain::ports::{CreativeOracle, ProgressSink, ReactionOracle};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConvergenceController, EvaluationDispatcher, EvolutionStep, SessionOutcome};
