//! Table output formatting for CLI commands
//!
//! Renders retained variants and focus group members with comfy-table.
//! Respects NO_COLOR and dumb terminals.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{FocusGroup, MessageVariantScore};

use super::truncate;

/// Longest wording shown in a table cell
const WORDING_WIDTH: usize = 60;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<usize>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub fn with_config(use_colors: bool, max_width: Option<usize>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format scored variants, best first, as they are given
    pub fn format_variants(&self, scores: &[MessageVariantScore]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            header("#"),
            header("Decision"),
            header("Normalized"),
            header("Average"),
            header("Reactions"),
            header("Wording"),
        ]);

        for (rank, score) in scores.iter().enumerate() {
            let decision = score.decision_score();
            let decision_cell = if self.use_colors {
                Cell::new(format!("{decision:.2}")).fg(score_color(decision))
            } else {
                Cell::new(format!("{decision:.2}"))
            };

            table.add_row(vec![
                Cell::new(rank + 1).set_alignment(CellAlignment::Right),
                decision_cell.set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", score.normalized_score))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", score.average_score))
                    .set_alignment(CellAlignment::Right),
                Cell::new(score.count).set_alignment(CellAlignment::Right),
                Cell::new(truncate(&score.message_variant.wording, WORDING_WIDTH)),
            ]);
        }

        table.to_string()
    }

    /// Format the members of a focus group with their share of the population
    pub fn format_participants(&self, group: &FocusGroup) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            header("ID"),
            header("Name"),
            header("Model"),
            header("Weight"),
        ]);

        for participant in group.participants() {
            let weight = group.normalized_weight(participant.as_ref());
            let id_cell = if self.use_colors {
                Cell::new(participant.id()).fg(Color::Cyan)
            } else {
                Cell::new(participant.id())
            };
            table.add_row(vec![
                id_cell,
                Cell::new(participant.name()),
                Cell::new(participant.llm().to_string()),
                Cell::new(format!("{:.1}%", weight * 100.0)).set_alignment(CellAlignment::Right),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(u16::try_from(width).unwrap_or(u16::MAX));
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(title: &str) -> Cell {
    Cell::new(title).add_attribute(Attribute::Bold)
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

fn score_color(decision: f64) -> Color {
    if decision >= 0.8 {
        Color::Green
    } else if decision >= 0.5 {
        Color::Yellow
    } else {
        Color::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        LlmOptions, Message, MessageVariant, Participant, PromptedParticipant,
    };
    use std::sync::Arc;

    fn score(wording: &str, normalized: f64) -> MessageVariantScore {
        let message = Arc::new(Message::new("nosmoke", "smoking is bad", "deter", "poster"));
        MessageVariantScore {
            message_variant: MessageVariant::new(message, wording),
            average_score: normalized,
            normalized_score: normalized,
            count: 2,
        }
    }

    #[test]
    fn test_table_formatter_with_config() {
        let formatter = TableFormatter::with_config(false, Some(120));
        assert!(!formatter.use_colors);
        assert_eq!(formatter.max_width, Some(120));
    }

    #[test]
    fn test_format_variants() {
        let formatter = TableFormatter::with_config(false, None);
        let output = formatter.format_variants(&[score("Winners don't smoke", 0.75)]);

        assert!(output.contains("Winners don't smoke"));
        assert!(output.contains("0.75"));
        assert!(output.contains("Decision"));
    }

    #[test]
    fn test_long_wordings_are_truncated() {
        let formatter = TableFormatter::with_config(false, None);
        let long = "a".repeat(80);
        let output = formatter.format_variants(&[score(&long, 0.5)]);
        assert!(!output.contains(&long));
        assert!(output.contains("..."));
    }

    #[test]
    fn test_format_participants() {
        let group = FocusGroup::new(vec![
            Arc::new(PromptedParticipant::new(
                "alex",
                LlmOptions::with_model("claude-haiku"),
                "16, skater",
                1.0,
            )) as Arc<dyn Participant>,
            Arc::new(PromptedParticipant::new("sam", LlmOptions::default(), "15", 3.0)),
        ])
        .unwrap();

        let formatter = TableFormatter::with_config(false, None);
        let output = formatter.format_participants(&group);

        assert!(output.contains("alex"));
        assert!(output.contains("claude-haiku"));
        assert!(output.contains("75.0%"));
    }
}
