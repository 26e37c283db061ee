use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::FocusGroup;

/// Source of focus groups.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Load the focus group with the given name.
    async fn find_by_group(&self, group: &str) -> DomainResult<FocusGroup>;

    /// Names of the groups available.
    async fn list_groups(&self) -> DomainResult<Vec<String>>;
}
