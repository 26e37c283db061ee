//! Reaction and creative oracle adapters.

pub mod anthropic;
pub mod mock;

pub use anthropic::{AnthropicCreativeOracle, AnthropicReactionOracle, MessagesClient};
pub use mock::{ScriptedCreativeOracle, ScriptedReactionOracle};
