//! Oracles backed by the Anthropic Messages API.
//!
//! Both oracles share one [`MessagesClient`], which owns the HTTP client and
//! the client-side rate limiter. Answers are requested as a JSON object and
//! extracted from the model's text.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult, OracleError};
use crate::domain::models::{LikertRating, LlmConfig, Reaction};
use crate::domain::ports::{
    CreativeOracle, NewMessageWordings, ReactionOracle, ReactionRequest, RewriteRequest,
};

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Thin Messages API client shared by the oracles.
pub struct MessagesClient {
    client: Client,
    base_url: String,
    api_version: String,
    api_key: Option<String>,
    max_tokens: u32,
    limiter: DefaultDirectRateLimiter,
}

impl MessagesClient {
    pub fn from_config(config: &LlmConfig) -> DomainResult<Self> {
        if !config.requests_per_second.is_finite() || config.requests_per_second <= 0.0 {
            return Err(DomainError::InvalidConfiguration(format!(
                "requests_per_second must be positive, got {}",
                config.requests_per_second
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::InvalidConfiguration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_key: config.resolve_api_key(),
            max_tokens: config.max_tokens,
            limiter: RateLimiter::direct(quota_for(config.requests_per_second)),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send one system + user exchange and return the answer text.
    pub async fn complete(
        &self,
        model: &str,
        temperature: Option<f32>,
        system: &str,
        user: &str,
    ) -> Result<String, OracleError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| OracleError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;

        let body = MessagesRequest {
            model,
            max_tokens: self.max_tokens,
            system: (!system.is_empty()).then_some(system),
            messages: vec![ApiMessage {
                role: "user",
                content: user,
            }],
            temperature,
        };

        self.limiter.until_ready().await;

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, text));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(format!("Failed to parse response: {e}")))?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text)
    }
}

fn quota_for(requests_per_second: f64) -> Quota {
    let burst = NonZeroU32::new(requests_per_second.ceil() as u32).unwrap_or(NonZeroU32::MIN);
    Quota::with_period(Duration::from_secs_f64(1.0 / requests_per_second))
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

/// 429 and 5xx (including 529 overloaded) are worth retrying.
fn classify_status(status: StatusCode, body: String) -> OracleError {
    let message = format!("API error {status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS {
        OracleError::RateLimited(message)
    } else if status.is_server_error() || status.as_u16() == 529 {
        OracleError::Transport(message)
    } else {
        OracleError::Model(message)
    }
}

/// The outermost JSON object in `text`, tolerating prose or code fences
/// around it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, OracleError> {
    let json = extract_json_object(text)
        .ok_or_else(|| OracleError::Malformed(format!("No JSON object in answer: {text}")))?;
    serde_json::from_str(json).map_err(|e| OracleError::Malformed(e.to_string()))
}

fn rating_choices() -> String {
    LikertRating::ALL
        .iter()
        .map(|r| serde_json::to_string(r).unwrap_or_else(|_| r.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reaction oracle that role-plays the participant's persona.
pub struct AnthropicReactionOracle {
    client: Arc<MessagesClient>,
    default_model: String,
}

impl AnthropicReactionOracle {
    pub fn new(client: Arc<MessagesClient>, default_model: impl Into<String>) -> Self {
        Self {
            client,
            default_model: default_model.into(),
        }
    }

    fn user_prompt(request: &ReactionRequest) -> String {
        format!(
            "You are a member of a focus group.\n\
             Your replies are confidential and you don't need to worry about\n\
             anyone knowing what you said, so you can share your feelings\n\
             honestly without fear of judgment or consequences.\n\
             Be honest.\n\n\
             React to the following message given your persona:\n\n\
             <message>{}</message>\n\n\
             Assess in terms of whether it would produce the following objective in your mind:\n\
             <objective>{}</objective>\n\
             Also consider whether it is effective as <deliverable>{}</deliverable>\n\n\
             Answer with a single JSON object with the fields \"positives\" (string),\n\
             \"negatives\" (string), \"quotes\" (array of strings) and \"rating\" (one of {}).",
            request.wording,
            request.objective,
            request.deliverable,
            rating_choices()
        )
    }
}

#[async_trait]
impl ReactionOracle for AnthropicReactionOracle {
    #[instrument(skip(self, request), fields(participant_id = %request.participant_id))]
    async fn evaluate(&self, request: &ReactionRequest) -> Result<Reaction, OracleError> {
        let model = request.llm.model.as_deref().unwrap_or(&self.default_model);
        let answer = self
            .client
            .complete(
                model,
                request.llm.temperature,
                &request.persona,
                &Self::user_prompt(request),
            )
            .await?;
        debug!(model, "Reaction answer received");
        parse_json(&answer)
    }
}

/// Creative oracle that rewrites wordings from feedback.
pub struct AnthropicCreativeOracle {
    client: Arc<MessagesClient>,
    model: String,
}

impl AnthropicCreativeOracle {
    pub fn new(client: Arc<MessagesClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn system_prompt(request: &RewriteRequest) -> String {
        let voice = request.creative.as_ref().map_or_else(
            || "You are an experienced creative director.\n".to_string(),
            |c| c.contribution(),
        );
        format!("{voice}\n{}", request.message.contribution())
    }

    fn user_prompt(request: &RewriteRequest) -> String {
        format!(
            "Given the objectives, consider the following feedback:\n{}\n\n\
             Create new message wordings we could try.\n\
             Preserve good-scoring messages, remove poorer ones.\n\
             Be creative. Try to break through!\n\n\
             Never use more than {} variants.\n\n\
             Current wordings: {}\n\n\
             Best scoring variants so far:\n{}\n\n\
             Answer with a single JSON object with the fields \"summary\" (what works and\n\
             what does not, at most {} words) and \"wordings\" (array of strings).",
            request.feedback,
            request.max_variants,
            request.current_wordings.join(" | "),
            request.best_so_far,
            request.max_words
        )
    }
}

#[async_trait]
impl CreativeOracle for AnthropicCreativeOracle {
    #[instrument(skip(self, request), fields(message_id = %request.message.id))]
    async fn rewrite(&self, request: &RewriteRequest) -> Result<NewMessageWordings, OracleError> {
        let answer = self
            .client
            .complete(
                &self.model,
                None,
                &Self::system_prompt(request),
                &Self::user_prompt(request),
            )
            .await?;
        parse_json(&answer)
    }
}
