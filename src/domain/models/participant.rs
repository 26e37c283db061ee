//! Focus group participants and the group that weights them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};

/// Model selector for a participant's oracle calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmOptions {
    /// Model name; the oracle default is used when absent
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl LlmOptions {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            temperature: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl fmt::Display for LlmOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.model.as_deref().unwrap_or("default");
        match self.temperature {
            Some(t) => write!(f, "{model}@{t}"),
            None => f.write_str(model),
        }
    }
}

/// A member of a focus group.
///
/// The id must be unique within a group: there can be several participants
/// with the same name running on different models.
pub trait Participant: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn llm(&self) -> &LlmOptions;

    /// Persona text given to the reaction oracle.
    fn contribution(&self) -> String;

    /// Share of the population this participant stands for. Not normalized.
    fn population_percentage(&self) -> f64 {
        1.0
    }
}

/// Participant whose identity prompt is solely responsible for its persona.
#[derive(Debug, Clone)]
pub struct PromptedParticipant {
    id: String,
    name: String,
    llm: LlmOptions,
    identity: String,
    population_percentage: f64,
}

impl PromptedParticipant {
    pub fn new(
        name: impl Into<String>,
        llm: LlmOptions,
        identity: impl Into<String>,
        population_percentage: f64,
    ) -> Self {
        let name = name.into();
        Self {
            id: format!("{name}-{llm}"),
            name,
            llm,
            identity: identity.into(),
            population_percentage,
        }
    }

    /// One participant per model selector, all sharing the same persona.
    pub fn against(
        name: &str,
        identity: &str,
        llms: &[LlmOptions],
        population_percentage: f64,
    ) -> Vec<Self> {
        llms.iter()
            .map(|llm| Self::new(name, llm.clone(), identity, population_percentage))
            .collect()
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl Participant for PromptedParticipant {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn llm(&self) -> &LlmOptions {
        &self.llm
    }

    fn contribution(&self) -> String {
        format!("NAME: {}\nIDENTITY:\n{}\n", self.name, self.identity.trim_end())
    }

    fn population_percentage(&self) -> f64 {
        self.population_percentage
    }
}

/// Participant described by structured demographic fields.
#[derive(Debug, Clone)]
pub struct ProfiledParticipant {
    id: String,
    name: String,
    llm: LlmOptions,
    age: u32,
    location: String,
    interests: Vec<String>,
    population_percentage: f64,
}

impl ProfiledParticipant {
    pub fn new(
        name: impl Into<String>,
        llm: LlmOptions,
        age: u32,
        location: impl Into<String>,
        interests: Vec<String>,
        population_percentage: f64,
    ) -> Self {
        let name = name.into();
        Self {
            id: format!("{name}-{llm}"),
            name,
            llm,
            age,
            location: location.into(),
            interests,
            population_percentage,
        }
    }
}

impl Participant for ProfiledParticipant {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn llm(&self) -> &LlmOptions {
        &self.llm
    }

    fn contribution(&self) -> String {
        let interests = if self.interests.is_empty() {
            "none in particular".to_string()
        } else {
            self.interests.join(", ")
        };
        format!(
            "NAME: {}\nIDENTITY:\nYou are {} years old and live in {}. Your interests: {}.\n",
            self.name, self.age, self.location, interests
        )
    }

    fn population_percentage(&self) -> f64 {
        self.population_percentage
    }
}

/// Focus group that can be reused across runs.
#[derive(Debug, Clone, Default)]
pub struct FocusGroup {
    participants: Vec<Arc<dyn Participant>>,
}

impl FocusGroup {
    /// Build a group, rejecting duplicate ids and unusable weights.
    pub fn new(participants: Vec<Arc<dyn Participant>>) -> DomainResult<Self> {
        let mut seen = HashSet::new();
        for p in &participants {
            if !seen.insert(p.id().to_string()) {
                return Err(DomainError::DuplicateParticipant(p.id().to_string()));
            }
            let weight = p.population_percentage();
            if !weight.is_finite() || weight <= 0.0 {
                return Err(DomainError::InvalidWeight {
                    participant_id: p.id().to_string(),
                    weight,
                });
            }
        }
        Ok(Self { participants })
    }

    pub fn participants(&self) -> &[Arc<dyn Participant>] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant weight divided by the total weight of the group.
    ///
    /// Recomputed on every call.
    pub fn normalized_weight(&self, participant: &dyn Participant) -> f64 {
        let total: f64 = self
            .participants
            .iter()
            .map(|p| p.population_percentage())
            .sum();
        if total <= 0.0 {
            return 0.0;
        }
        participant.population_percentage() / total
    }
}
