//! Focus groups defined in YAML files, one file per group.
//!
//! ```yaml
//! participants:
//!   - name: Kelly
//!     identity: 17 year old who loves tennis
//!   - name: Tom
//!     age: 16
//!     location: Chertsey
//!     interests: [gym, politics]
//!     population_percentage: 2.0
//! llms:
//!   - model: claude-haiku-4-5
//!   - model: claude-haiku-4-5
//!     temperature: 0.9
//! ```
//!
//! The group is every participant crossed with every model selector. With no
//! `llms` each participant runs once on the default model.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    FocusGroup, LlmOptions, Participant, ProfiledParticipant, PromptedParticipant,
};
use crate::domain::ports::ParticipantRepository;

#[derive(Debug, Deserialize)]
struct GroupFile {
    participants: Vec<ParticipantEntry>,
    #[serde(default)]
    llms: Vec<LlmOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParticipantEntry {
    Prompted {
        name: String,
        identity: String,
        #[serde(default = "default_weight")]
        population_percentage: f64,
    },
    Profiled {
        name: String,
        age: u32,
        location: String,
        #[serde(default)]
        interests: Vec<String>,
        #[serde(default = "default_weight")]
        population_percentage: f64,
    },
}

const fn default_weight() -> f64 {
    1.0
}

impl ParticipantEntry {
    fn against(&self, llm: &LlmOptions) -> Arc<dyn Participant> {
        match self {
            Self::Prompted {
                name,
                identity,
                population_percentage,
            } => Arc::new(PromptedParticipant::new(
                name.as_str(),
                llm.clone(),
                identity.as_str(),
                *population_percentage,
            )),
            Self::Profiled {
                name,
                age,
                location,
                interests,
                population_percentage,
            } => Arc::new(ProfiledParticipant::new(
                name.as_str(),
                llm.clone(),
                *age,
                location.as_str(),
                interests.clone(),
                *population_percentage,
            )),
        }
    }
}

/// Reads `{dir}/{group}.yml`.
#[derive(Debug, Clone)]
pub struct YamlParticipantRepository {
    dir: PathBuf,
}

impl YamlParticipantRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, group: &str) -> PathBuf {
        self.dir.join(format!("{group}.yml"))
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> DomainError {
    DomainError::Repository(format!("Failed to load participants from {}: {err}", path.display()))
}

#[async_trait]
impl ParticipantRepository for YamlParticipantRepository {
    async fn find_by_group(&self, group: &str) -> DomainResult<FocusGroup> {
        let path = self.path_for(group);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| read_error(&path, e))?;
        let file: GroupFile = serde_yaml::from_str(&text).map_err(|e| read_error(&path, e))?;

        let llms = if file.llms.is_empty() {
            vec![LlmOptions::default()]
        } else {
            file.llms
        };

        let participants: Vec<Arc<dyn Participant>> = file
            .participants
            .iter()
            .flat_map(|entry| llms.iter().map(move |llm| entry.against(llm)))
            .collect();
        debug!(group, participants = participants.len(), "Loaded focus group");

        FocusGroup::new(participants)
    }

    async fn list_groups(&self) -> DomainResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut groups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    groups.push(stem.to_string());
                }
            }
        }
        groups.sort();
        Ok(groups)
    }
}
