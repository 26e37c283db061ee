use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::MessageVariants;

/// Source of messages and their initial wordings.
#[async_trait]
pub trait MessageVariantsRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> DomainResult<MessageVariants>;
}
