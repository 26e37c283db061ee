use serde::{Deserialize, Serialize};

/// Main configuration structure for Grouper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Session knobs for the evaluation and evolution loop
    #[serde(default)]
    pub focus: FocusConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Messages API configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Locations of participant and message definitions
    #[serde(default)]
    pub data: DataConfig,
}

/// Knobs of the convergence loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FocusConfig {
    /// Maximum oracle calls in flight during a dispatch
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum retained variants, and maximum wordings per evolution
    #[serde(default = "default_max_variants")]
    pub max_variants: usize,

    /// Iteration budget for one session
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Decision score the best variant must exceed to stop early
    #[serde(default = "default_min_message_score")]
    pub min_message_score: f64,

    /// Word budget for the feedback summary of each evolution
    #[serde(default = "default_findings_word_count")]
    pub findings_word_count: usize,

    /// Creative personas used in turn when evolving wordings
    #[serde(default)]
    pub creatives: Vec<CreativePersona>,
}

const fn default_max_concurrency() -> usize {
    8
}

const fn default_max_variants() -> usize {
    10
}

const fn default_max_iterations() -> usize {
    5
}

const fn default_min_message_score() -> f64 {
    0.8
}

const fn default_findings_word_count() -> usize {
    120
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_variants: default_max_variants(),
            max_iterations: default_max_iterations(),
            min_message_score: default_min_message_score(),
            findings_word_count: default_findings_word_count(),
            creatives: Vec::new(),
        }
    }
}

/// Persona of a copywriter asked to rewrite wordings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreativePersona {
    pub name: String,
    pub role: String,
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
}

impl CreativePersona {
    /// Prompt text introducing this creative.
    pub fn contribution(&self) -> String {
        let mut text = format!(
            "You are {}, {}.\nYour goal: {}\n",
            self.name, self.role, self.goal
        );
        if !self.backstory.is_empty() {
            text.push_str("Backstory: ");
            text.push_str(&self.backstory);
            text.push('\n');
        }
        text
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Rotation of log files: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Messages API configuration shared by the reaction and creative oracles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Base URL for the API (for testing/proxies)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the anthropic-version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API key (can also be set via ANTHROPIC_API_KEY env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used when a participant does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model used to evolve wordings
    #[serde(default = "default_model")]
    pub creative_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Client-side request rate limit
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_max_tokens() -> u32 {
    2048
}

const fn default_requests_per_second() -> f64 {
    5.0
}

impl LlmConfig {
    /// Configured key, falling back to `ANTHROPIC_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            api_key: None,
            default_model: default_model(),
            creative_model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Where focus groups and messages are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataConfig {
    #[serde(default = "default_participants_dir")]
    pub participants_dir: String,

    #[serde(default = "default_messages_dir")]
    pub messages_dir: String,
}

fn default_participants_dir() -> String {
    "data/participants".to_string()
}

fn default_messages_dir() -> String {
    "data/messages".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            participants_dir: default_participants_dir(),
            messages_dir: default_messages_dir(),
        }
    }
}
