//! `grouper participants`: inspect focus groups.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::yaml::YamlParticipantRepository;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::types::ParticipantsArgs;
use crate::domain::models::{Config, FocusGroup};
use crate::domain::ports::ParticipantRepository;

#[derive(Debug, Serialize)]
pub struct ParticipantOutput {
    pub id: String,
    pub name: String,
    pub model: String,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct ParticipantListOutput {
    pub group: String,
    pub participants: Vec<ParticipantOutput>,
    #[serde(skip)]
    table: String,
}

impl ParticipantListOutput {
    fn new(group: &str, focus_group: &FocusGroup) -> Self {
        let participants = focus_group
            .participants()
            .iter()
            .map(|p| ParticipantOutput {
                id: p.id().to_string(),
                name: p.name().to_string(),
                model: p.llm().to_string(),
                weight: focus_group.normalized_weight(p.as_ref()),
            })
            .collect();
        Self {
            group: group.to_string(),
            participants,
            table: TableFormatter::new().format_participants(focus_group),
        }
    }
}

impl CommandOutput for ParticipantListOutput {
    fn to_human(&self) -> String {
        format!(
            "Focus group '{}' has {} participant(s):\n{}",
            self.group,
            self.participants.len(),
            self.table
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct GroupListOutput {
    pub groups: Vec<String>,
}

impl CommandOutput for GroupListOutput {
    fn to_human(&self) -> String {
        if self.groups.is_empty() {
            return "No focus groups found.".to_string();
        }
        let mut lines = vec![format!("Found {} focus group(s):", self.groups.len())];
        lines.extend(self.groups.iter().map(|g| format!("  {g}")));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ParticipantsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let repository = YamlParticipantRepository::new(&config.data.participants_dir);

    match args.group {
        Some(group) => {
            let focus_group = repository
                .find_by_group(&group)
                .await
                .with_context(|| format!("Failed to load focus group '{group}'"))?;
            output(&ParticipantListOutput::new(&group, &focus_group), json_mode);
        }
        None => {
            let groups = repository
                .list_groups()
                .await
                .context("Failed to list focus groups")?;
            output(&GroupListOutput { groups }, json_mode);
        }
    }
    Ok(())
}
