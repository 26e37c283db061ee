//! Cross-iteration accumulator of the best scoring variants.

use indexmap::IndexMap;
use std::fmt;

use super::focus_group_run::FocusGroupRun;
use super::scoring::{scored_variants, MessageVariantScore};

/// Bounded, deduplicated ranking of the best variants seen in a session,
/// plus the qualitative findings gathered along the way.
///
/// Owned by the session controller and only touched between dispatches.
#[derive(Debug, Clone)]
pub struct BestScoringVariants {
    max_variants: usize,
    variants: Vec<MessageVariantScore>,
    findings: Vec<String>,
}

impl BestScoringVariants {
    pub fn new(max_variants: usize) -> Self {
        Self {
            max_variants,
            variants: Vec::new(),
            findings: Vec::new(),
        }
    }

    pub fn max_variants(&self) -> usize {
        self.max_variants
    }

    /// Retained variants, best decision score first.
    pub fn variants(&self) -> &[MessageVariantScore] {
        &self.variants
    }

    pub fn findings(&self) -> &[String] {
        &self.findings
    }

    pub fn best(&self) -> Option<&MessageVariantScore> {
        self.variants.first()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Merge the scores of every reacted-to variant in `run`.
    pub fn update_from(&mut self, run: &FocusGroupRun) {
        self.merge(scored_variants(run));
    }

    /// Merge new scores into the retained list.
    ///
    /// Entries are keyed by trimmed wording; the first occurrence of a key
    /// wins, so already retained entries shadow later duplicates. The result
    /// is sorted by decision score, descending, and truncated to
    /// `max_variants`.
    pub fn merge(&mut self, scores: impl IntoIterator<Item = MessageVariantScore>) {
        let mut by_wording: IndexMap<String, MessageVariantScore> = IndexMap::new();
        for score in self.variants.drain(..).chain(scores) {
            let key = score.message_variant.wording.trim().to_string();
            by_wording.entry(key).or_insert(score);
        }

        let mut merged: Vec<MessageVariantScore> = by_wording.into_values().collect();
        merged.sort_by(|a, b| b.decision_score().total_cmp(&a.decision_score()));
        merged.truncate(self.max_variants);
        self.variants = merged;
    }

    pub fn add_finding(&mut self, finding: impl Into<String>) {
        self.findings.push(finding.into());
    }
}

impl fmt::Display for BestScoringVariants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for score in &self.variants {
            writeln!(f, "{:.2}: {}", score.decision_score(), score.message_variant.wording)?;
        }
        if !self.findings.is_empty() {
            writeln!(f, "\nFindings:")?;
            for finding in &self.findings {
                writeln!(f, "- {finding}")?;
            }
        }
        Ok(())
    }
}
