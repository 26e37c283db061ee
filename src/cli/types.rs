//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "grouper")]
#[command(about = "Grouper - simulated focus groups for message wordings", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of grouper.yaml
    #[arg(short, long, global = true, env = "GROUPER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a focus group session and evolve the wordings
    Focus(FocusArgs),

    /// List the participants of a focus group
    Participants(ParticipantsArgs),

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct FocusArgs {
    /// Focus group name (file stem under the participants directory)
    #[arg(short, long)]
    pub group: String,

    /// Message name (file stem under the messages directory)
    #[arg(short, long)]
    pub messages: String,

    /// Use scripted oracles instead of the Messages API
    #[arg(long)]
    pub dry_run: bool,

    /// Override focus.max_iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Override focus.max_concurrency
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Also print the detailed results of the final run
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct ParticipantsArgs {
    /// Focus group name; lists available groups when omitted
    #[arg(short, long)]
    pub group: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_focus_command() {
        let cli = Cli::try_parse_from([
            "grouper",
            "--json",
            "focus",
            "--group",
            "teens",
            "--messages",
            "nosmoke",
            "--dry-run",
            "--max-iterations",
            "2",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Focus(args) => {
                assert_eq!(args.group, "teens");
                assert_eq!(args.messages, "nosmoke");
                assert!(args.dry_run);
                assert_eq!(args.max_iterations, Some(2));
                assert_eq!(args.max_concurrency, None);
            }
            other => panic!("Expected focus command, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["grouper", "config", "--config", "custom.yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn test_focus_requires_group_and_messages() {
        assert!(Cli::try_parse_from(["grouper", "focus", "--group", "teens"]).is_err());
    }
}
