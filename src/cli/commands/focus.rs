//! `grouper focus`: run a session and report the retained wordings.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::adapters::oracles::{
    AnthropicCreativeOracle, AnthropicReactionOracle, MessagesClient, ScriptedCreativeOracle,
    ScriptedReactionOracle,
};
use crate::adapters::yaml::{YamlMessageVariantsRepository, YamlParticipantRepository};
use crate::cli::output::{output, CommandOutput, ProgressBarSink, TableFormatter};
use crate::cli::types::FocusArgs;
use crate::domain::models::{Config, Positioning, ScoreSummary};
use crate::domain::ports::{
    CreativeOracle, MessageVariantsRepository, ParticipantRepository, ReactionOracle,
};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{
    ConvergenceController, EvaluationDispatcher, EvolutionStep, RetryPolicy,
    RetryingCreativeOracle, RetryingReactionOracle, SessionOutcome, StopReason,
};

#[derive(Debug, Serialize)]
pub struct FocusOutput {
    pub session_id: String,
    pub group: String,
    pub message_id: String,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub best: Vec<ScoreSummary>,
    pub findings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_run: Option<String>,
    #[serde(skip)]
    table: Option<String>,
}

impl FocusOutput {
    fn from_outcome(group: &str, message_id: &str, outcome: &SessionOutcome, verbose: bool) -> Self {
        let table = (!outcome.best.is_empty())
            .then(|| TableFormatter::new().format_variants(outcome.best.variants()));
        Self {
            session_id: outcome.session_id.to_string(),
            group: group.to_string(),
            message_id: message_id.to_string(),
            iterations: outcome.iterations,
            stop_reason: outcome.stop_reason,
            best: outcome.best.variants().iter().map(ScoreSummary::from).collect(),
            findings: outcome.best.findings().to_vec(),
            final_run: verbose.then(|| outcome.final_run.info_string(true, 0)),
            table,
        }
    }
}

impl CommandOutput for FocusOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Session {} on '{}' finished after {} iteration(s): {}",
            &self.session_id[..8],
            self.group,
            self.iterations,
            self.stop_reason
        )];

        match &self.table {
            Some(table) => {
                lines.push(String::new());
                lines.push(table.clone());
            }
            None => lines.push("No wording received any reaction.".to_string()),
        }

        if !self.findings.is_empty() {
            lines.push(String::new());
            lines.push("Findings:".to_string());
            for (i, finding) in self.findings.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, finding));
            }
        }

        if let Some(run) = &self.final_run {
            lines.push(String::new());
            lines.push(run.clone());
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: FocusArgs, mut config: Config, json_mode: bool) -> Result<()> {
    if let Some(max_iterations) = args.max_iterations {
        config.focus.max_iterations = max_iterations;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        config.focus.max_concurrency = max_concurrency;
    }
    ConfigLoader::validate(&config)?;

    let participants = YamlParticipantRepository::new(&config.data.participants_dir);
    let messages = YamlMessageVariantsRepository::new(&config.data.messages_dir);

    let group = participants
        .find_by_group(&args.group)
        .await
        .with_context(|| format!("Failed to load focus group '{}'", args.group))?;
    let variants = messages
        .find_by_name(&args.messages)
        .await
        .with_context(|| format!("Failed to load message '{}'", args.messages))?;
    let message_id = variants.message.id.clone();

    let (reactions, creative) = build_oracles(&config, args.dry_run)?;

    let progress = Arc::new(if json_mode {
        ProgressBarSink::hidden()
    } else {
        ProgressBarSink::new()
    });
    let dispatcher = EvaluationDispatcher::new(reactions, config.focus.max_concurrency)
        .with_progress(progress.clone());
    let evolution = EvolutionStep::from_config(creative, &config.focus);
    let controller = ConvergenceController::new(dispatcher, evolution, &config.focus);

    info!(
        group = %args.group,
        message = %message_id,
        participants = group.len(),
        dry_run = args.dry_run,
        "Starting focus session"
    );
    let outcome = controller.run(group, Positioning::single(variants)).await;
    progress.finish();
    let outcome = outcome.context("Focus session failed")?;

    let report = FocusOutput::from_outcome(&args.group, &message_id, &outcome, args.verbose);
    output(&report, json_mode);
    Ok(())
}

fn build_oracles(
    config: &Config,
    dry_run: bool,
) -> Result<(Arc<dyn ReactionOracle>, Arc<dyn CreativeOracle>)> {
    if dry_run {
        return Ok((
            Arc::new(ScriptedReactionOracle::hashed()),
            Arc::new(ScriptedCreativeOracle::rephrasing()),
        ));
    }

    let client = Arc::new(MessagesClient::from_config(&config.llm)?);
    if !client.has_api_key() {
        bail!("No API key configured: set llm.api_key or ANTHROPIC_API_KEY, or pass --dry-run");
    }

    let policy = RetryPolicy::from_config(&config.retry);
    let reactions = Arc::new(AnthropicReactionOracle::new(
        Arc::clone(&client),
        config.llm.default_model.clone(),
    ));
    let creative = Arc::new(AnthropicCreativeOracle::new(
        client,
        config.llm.creative_model.clone(),
    ));

    Ok((
        Arc::new(RetryingReactionOracle::new(reactions, policy.clone())),
        Arc::new(RetryingCreativeOracle::new(creative, policy)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        BestScoringVariants, FocusGroup, FocusGroupRun, LlmOptions, Message, MessageVariants,
        Participant, PromptedParticipant,
    };
    use uuid::Uuid;

    fn outcome() -> SessionOutcome {
        let group = FocusGroup::new(vec![Arc::new(PromptedParticipant::new(
            "alex",
            LlmOptions::default(),
            "16",
            1.0,
        )) as Arc<dyn Participant>])
        .unwrap();
        let message = Arc::new(Message::new("nosmoke", "smoking is bad", "deter", "poster"));
        let run = FocusGroupRun::new(
            group,
            Positioning::single(MessageVariants::new(message, ["Smoking is uncool"])),
        );
        let mut best = BestScoringVariants::new(3);
        best.add_finding("Humour beats fear");
        SessionOutcome {
            session_id: Uuid::new_v4(),
            best,
            iterations: 2,
            stop_reason: StopReason::IterationBudgetExhausted,
            final_run: run,
        }
    }

    #[test]
    fn test_focus_output_json_shape() {
        let outcome = outcome();
        let output = FocusOutput::from_outcome("teens", "nosmoke", &outcome, false);
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["iterations"], 2);
        assert_eq!(json["stop_reason"]["reason"], "iteration_budget_exhausted");
        assert_eq!(json["findings"][0], "Humour beats fear");
        assert!(json.get("final_run").is_none());
    }

    #[test]
    fn test_human_report_mentions_findings() {
        let outcome = outcome();
        let text = FocusOutput::from_outcome("teens", "nosmoke", &outcome, true).to_human();

        assert!(text.contains("2 iteration(s)"));
        assert!(text.contains("No wording received any reaction."));
        assert!(text.contains("1. Humour beats fear"));
        assert!(text.contains("Focus Group Results"));
    }

    #[test]
    fn test_live_oracles_require_an_api_key() {
        temp_env::with_var("ANTHROPIC_API_KEY", None::<&str>, || {
            let err = build_oracles(&Config::default(), false).err().unwrap();
            assert!(err.to_string().contains("--dry-run"));
        });
    }

    #[test]
    fn test_dry_run_needs_no_key() {
        assert!(build_oracles(&Config::default(), true).is_ok());
    }
}
