//! Creative oracle port: rewrite wordings from focus group feedback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::errors::OracleError;
use crate::domain::models::{CreativePersona, Message};

/// Input of one evolution.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    pub message: Arc<Message>,
    /// Detailed rendering of the last run's results
    pub feedback: String,
    /// Word budget of the returned summary
    pub max_words: usize,
    /// Upper bound on the number of returned wordings
    pub max_variants: usize,
    /// Rendering of the best variants retained so far
    pub best_so_far: String,
    pub current_wordings: Vec<String>,
    /// Voice to write in; the oracle's default voice when absent
    pub creative: Option<CreativePersona>,
}

/// Output of one evolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessageWordings {
    /// Summary of what the feedback says works and what does not
    pub summary: String,
    /// New wordings to test
    pub wordings: Vec<String>,
}

#[async_trait]
pub trait CreativeOracle: Send + Sync {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<NewMessageWordings, OracleError>;
}
