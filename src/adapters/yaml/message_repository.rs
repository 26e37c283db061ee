//! Messages defined in YAML files, one file per message.
//!
//! ```yaml
//! message:
//!   id: nosmoke
//!   content: smoking is bad
//!   objective: deter the reader from smoking
//!   deliverable: a poster slogan
//! wordings:
//!   - Smoking is uncool
//!   - Winners don't smoke
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Message, MessageVariants};
use crate::domain::ports::MessageVariantsRepository;

#[derive(Debug, Deserialize)]
struct MessageFile {
    message: Message,
    wordings: Vec<String>,
}

/// Reads `{dir}/{name}.yml`.
#[derive(Debug, Clone)]
pub struct YamlMessageVariantsRepository {
    dir: PathBuf,
}

impl YamlMessageVariantsRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> DomainError {
    DomainError::Repository(format!(
        "Failed to load message variants from {}: {err}",
        path.display()
    ))
}

#[async_trait]
impl MessageVariantsRepository for YamlMessageVariantsRepository {
    async fn find_by_name(&self, name: &str) -> DomainResult<MessageVariants> {
        let path = self.dir.join(format!("{name}.yml"));
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| read_error(&path, e))?;
        let file: MessageFile = serde_yaml::from_str(&text).map_err(|e| read_error(&path, e))?;

        Ok(MessageVariants::new(Arc::new(file.message), file.wordings))
    }
}
