//! Evolution of the positioning between iterations.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BestScoringVariants, CreativePersona, FocusConfig, FocusGroupRun, MessageVariants, Positioning,
};
use crate::domain::ports::{CreativeOracle, RewriteRequest};

/// Asks the creative oracle for new wordings of the first message.
pub struct EvolutionStep {
    oracle: Arc<dyn CreativeOracle>,
    creatives: Vec<CreativePersona>,
    max_variants: usize,
    findings_word_count: usize,
}

impl EvolutionStep {
    pub fn new(
        oracle: Arc<dyn CreativeOracle>,
        creatives: Vec<CreativePersona>,
        max_variants: usize,
        findings_word_count: usize,
    ) -> Self {
        Self {
            oracle,
            creatives,
            max_variants,
            findings_word_count,
        }
    }

    pub fn from_config(oracle: Arc<dyn CreativeOracle>, focus: &FocusConfig) -> Self {
        Self::new(
            oracle,
            focus.creatives.clone(),
            focus.max_variants,
            focus.findings_word_count,
        )
    }

    /// Creative used for the given iteration, taken in turn from the roster.
    pub fn creative_for(&self, iteration: usize) -> Option<&CreativePersona> {
        if self.creatives.is_empty() {
            None
        } else {
            self.creatives.get(iteration % self.creatives.len())
        }
    }

    /// Produce the next positioning from `run`.
    ///
    /// Only the first message of the positioning is evolved and the result
    /// holds that message alone. The oracle's summary is appended to the
    /// findings of `best`.
    #[instrument(skip(self, run, best), fields(run_id = %run.id))]
    pub async fn evolve(
        &self,
        run: &FocusGroupRun,
        best: &mut BestScoringVariants,
        iteration: usize,
    ) -> DomainResult<Positioning> {
        let current = run.positioning.message_variants.first().ok_or_else(|| {
            DomainError::InvalidConfiguration("positioning has no messages to evolve".to_string())
        })?;
        let message = Arc::clone(&current.message);
        let creative = self.creative_for(iteration).cloned();
        if let Some(c) = &creative {
            info!(creative = %c.name, "Evolving wordings");
        }

        let request = RewriteRequest {
            message: Arc::clone(&message),
            feedback: run.info_string(true, 1),
            max_words: self.findings_word_count,
            max_variants: self.max_variants,
            best_so_far: best.to_string(),
            current_wordings: current.wordings(),
            creative,
        };

        let proposal = self
            .oracle
            .rewrite(&request)
            .await
            .map_err(DomainError::CreativeFailed)?;

        let wordings = clean_wordings(proposal.wordings, self.max_variants);
        if wordings.is_empty() {
            return Err(DomainError::EmptyEvolution(message.id.clone()));
        }

        let summary = proposal.summary.trim();
        if !summary.is_empty() {
            best.add_finding(summary);
        }

        info!(message_id = %message.id, wordings = wordings.len(), "New wordings");
        Ok(Positioning::single(MessageVariants::new(message, wordings)))
    }
}

/// Trim, drop blanks and repeats, keep at most `max_variants`.
fn clean_wordings(wordings: Vec<String>, max_variants: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    wordings
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .take(max_variants)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracles::mock::ScriptedCreativeOracle;
    use crate::domain::errors::OracleError;
    use crate::domain::models::{
        FocusGroup, LlmOptions, Message, Participant, PromptedParticipant,
    };

    fn creative(name: &str) -> CreativePersona {
        CreativePersona {
            name: name.to_string(),
            role: "copywriter".to_string(),
            goal: "break through".to_string(),
            backstory: String::new(),
        }
    }

    fn two_message_run() -> FocusGroupRun {
        let group = FocusGroup::new(vec![Arc::new(PromptedParticipant::new(
            "a",
            LlmOptions::default(),
            "persona",
            1.0,
        )) as Arc<dyn Participant>])
        .unwrap();
        let first = Arc::new(Message::new("nosmoke", "smoking is bad", "deter", "poster"));
        let second = Arc::new(Message::new("vape", "vaping is bad", "deter", "poster"));
        FocusGroupRun::new(
            group,
            Positioning::new(vec![
                MessageVariants::new(first, ["Smoking is uncool"]),
                MessageVariants::new(second, ["Vaping is uncool"]),
            ]),
        )
    }

    #[test]
    fn test_creatives_rotate_round_robin() {
        let oracle = Arc::new(ScriptedCreativeOracle::new("s", ["x"]));
        let step = EvolutionStep::new(oracle, vec![creative("a"), creative("b")], 5, 50);
        assert_eq!(step.creative_for(0).unwrap().name, "a");
        assert_eq!(step.creative_for(1).unwrap().name, "b");
        assert_eq!(step.creative_for(2).unwrap().name, "a");

        let bare = EvolutionStep::new(Arc::new(ScriptedCreativeOracle::new("s", ["x"])), vec![], 5, 50);
        assert!(bare.creative_for(3).is_none());
    }

    #[test]
    fn test_clean_wordings() {
        let cleaned = clean_wordings(
            vec![
                "  one ".into(),
                String::new(),
                "one".into(),
                "two".into(),
                "   ".into(),
                "three".into(),
            ],
            2,
        );
        assert_eq!(cleaned, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_evolves_first_message_only() {
        let oracle = Arc::new(ScriptedCreativeOracle::new(
            "Humour beats fear",
            ["Winners don't smoke", "Smoking is so 1950s"],
        ));
        let step = EvolutionStep::new(oracle.clone(), vec![creative("dana")], 5, 80);
        let run = two_message_run();
        let mut best = BestScoringVariants::new(5);

        let next = step.evolve(&run, &mut best, 0).await.unwrap();

        assert_eq!(next.message_variants.len(), 1);
        let evolved = &next.message_variants[0];
        assert_eq!(evolved.message.id, "nosmoke");
        assert!(Arc::ptr_eq(
            &evolved.message,
            &run.positioning.message_variants[0].message
        ));
        assert_eq!(evolved.wordings(), vec!["Winners don't smoke", "Smoking is so 1950s"]);
        assert_eq!(best.findings(), &["Humour beats fear".to_string()]);

        let request = oracle.last_request().unwrap();
        assert_eq!(request.max_words, 80);
        assert_eq!(request.max_variants, 5);
        assert_eq!(request.current_wordings, vec!["Smoking is uncool"]);
        assert_eq!(request.creative.unwrap().name, "dana");
        assert!(request.feedback.contains("Focus Group Results"));
    }

    #[tokio::test]
    async fn test_zero_wordings_is_fatal() {
        let oracle = Arc::new(ScriptedCreativeOracle::new("nothing works", ["  ", ""]));
        let step = EvolutionStep::new(oracle, vec![], 5, 80);
        let mut best = BestScoringVariants::new(5);
        let err = step
            .evolve(&two_message_run(), &mut best, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmptyEvolution(id) if id == "nosmoke"));
        assert!(best.findings().is_empty());
    }

    #[tokio::test]
    async fn test_oracle_failure_propagates() {
        let oracle = Arc::new(
            ScriptedCreativeOracle::new("s", ["x"])
                .failing_with(OracleError::Model("overloaded".into())),
        );
        let step = EvolutionStep::new(oracle, vec![], 5, 80);
        let mut best = BestScoringVariants::new(5);
        let err = step
            .evolve(&two_message_run(), &mut best, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CreativeFailed(OracleError::Model(_))));
    }
}
