//! Retry decorators for the oracle ports.
//!
//! Transient failures (transport, rate limiting) are retried with
//! exponential backoff; everything else fails immediately. Wrapping an
//! oracle does not change how the dispatcher or evolution step use it.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::errors::OracleError;
use crate::domain::models::{Reaction, RetryConfig};
use crate::domain::ports::{
    CreativeOracle, NewMessageWordings, ReactionOracle, ReactionRequest, RewriteRequest,
};

/// Retry policy with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,

    /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. The last error is returned.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T, OracleError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.max_backoff_ms))
            .with_max_elapsed_time(None)
            .build();

        let max_retries = self.max_retries;
        let mut attempt = 0u32;

        backoff::future::retry_notify(
            policy,
            || {
                attempt += 1;
                let retries_used = attempt - 1;
                let call = operation();
                async move {
                    match call.await {
                        Ok(value) => Ok(value),
                        Err(err) if err.is_transient() && retries_used < max_retries => {
                            Err(backoff::Error::transient(err))
                        }
                        Err(err) => Err(backoff::Error::permanent(err)),
                    }
                }
            },
            |err: OracleError, wait: Duration| {
                warn!(
                    operation = operation_name,
                    error = %err,
                    backoff_ms = wait.as_millis() as u64,
                    "Transient oracle failure, retrying"
                );
            },
        )
        .await
    }
}

/// Reaction oracle that retries transient failures of the wrapped oracle.
pub struct RetryingReactionOracle {
    inner: Arc<dyn ReactionOracle>,
    policy: RetryPolicy,
}

impl RetryingReactionOracle {
    pub fn new(inner: Arc<dyn ReactionOracle>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl ReactionOracle for RetryingReactionOracle {
    async fn evaluate(&self, request: &ReactionRequest) -> Result<Reaction, OracleError> {
        let inner = &self.inner;
        self.policy
            .execute("evaluate", move || inner.evaluate(request))
            .await
    }
}

/// Creative oracle that retries transient failures of the wrapped oracle.
pub struct RetryingCreativeOracle {
    inner: Arc<dyn CreativeOracle>,
    policy: RetryPolicy,
}

impl RetryingCreativeOracle {
    pub fn new(inner: Arc<dyn CreativeOracle>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl CreativeOracle for RetryingCreativeOracle {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<NewMessageWordings, OracleError> {
        let inner = &self.inner;
        self.policy
            .execute("rewrite", move || inner.rewrite(request))
            .await
    }
}
