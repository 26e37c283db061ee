//! Scripted oracles for dry runs and testing.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::errors::OracleError;
use crate::domain::models::{LikertRating, Reaction};
use crate::domain::ports::{
    CreativeOracle, NewMessageWordings, ReactionOracle, ReactionRequest, RewriteRequest,
};

/// How a scripted oracle rates combinations without an explicit rating.
#[derive(Debug, Clone, Copy)]
enum DefaultRating {
    Uniform(LikertRating),
    /// Stable pseudo-random rating derived from participant and wording
    Hashed,
}

/// Fails the first `remaining` calls with `error`.
#[derive(Debug)]
struct LeadingFailures {
    remaining: AtomicU32,
    error: OracleError,
}

impl LeadingFailures {
    fn take(&self) -> Option<OracleError> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .ok()
            .map(|_| self.error.clone())
    }
}

/// Reaction oracle answering from a script.
///
/// Ratings are keyed by (participant id, wording). Tracks how many calls it
/// served and how many were in flight at once.
#[derive(Debug)]
pub struct ScriptedReactionOracle {
    default: DefaultRating,
    ratings: HashMap<(String, String), LikertRating>,
    failures: HashMap<(String, String), OracleError>,
    leading_failures: Option<LeadingFailures>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedReactionOracle {
    fn with_default(default: DefaultRating) -> Self {
        Self {
            default,
            ratings: HashMap::new(),
            failures: HashMap::new(),
            leading_failures: None,
            latency: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every combination gets `rating` unless scripted otherwise.
    pub fn uniform(rating: LikertRating) -> Self {
        Self::with_default(DefaultRating::Uniform(rating))
    }

    /// Ratings vary per combination but are stable across calls.
    pub fn hashed() -> Self {
        Self::with_default(DefaultRating::Hashed)
    }

    #[must_use]
    pub fn with_rating(
        mut self,
        participant_id: impl Into<String>,
        wording: impl Into<String>,
        rating: LikertRating,
    ) -> Self {
        self.ratings
            .insert((participant_id.into(), wording.into()), rating);
        self
    }

    #[must_use]
    pub fn fail_on(
        mut self,
        participant_id: impl Into<String>,
        wording: impl Into<String>,
        error: OracleError,
    ) -> Self {
        self.failures
            .insert((participant_id.into(), wording.into()), error);
        self
    }

    /// Fail the first `count` calls, whatever they are for.
    #[must_use]
    pub fn failing_first(mut self, count: u32, error: OracleError) -> Self {
        self.leading_failures = Some(LeadingFailures {
            remaining: AtomicU32::new(count),
            error,
        });
        self
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn rating_for(&self, participant_id: &str, wording: &str) -> LikertRating {
        let key = (participant_id.to_string(), wording.to_string());
        if let Some(rating) = self.ratings.get(&key) {
            return *rating;
        }
        match self.default {
            DefaultRating::Uniform(rating) => rating,
            DefaultRating::Hashed => {
                let mut hasher = DefaultHasher::new();
                key.hash(&mut hasher);
                let index = (hasher.finish() % LikertRating::ALL.len() as u64) as usize;
                LikertRating::ALL[index]
            }
        }
    }

    async fn answer(&self, request: &ReactionRequest) -> Result<Reaction, OracleError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = self.leading_failures.as_ref().and_then(LeadingFailures::take) {
            return Err(err);
        }
        let key = (request.participant_id.clone(), request.wording.clone());
        if let Some(err) = self.failures.get(&key) {
            return Err(err.clone());
        }

        let rating = self.rating_for(&request.participant_id, &request.wording);
        Ok(Reaction {
            positives: format!("{} finds the wording clear", request.participant_name),
            negatives: if rating.score() < 0.5 {
                "Feels preachy".to_string()
            } else {
                String::new()
            },
            quotes: vec![format!("I {rating} with this.")],
            rating,
        })
    }
}

#[async_trait]
impl ReactionOracle for ScriptedReactionOracle {
    async fn evaluate(&self, request: &ReactionRequest) -> Result<Reaction, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.answer(request).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Debug, Clone)]
enum Proposal {
    Fixed(NewMessageWordings),
    /// Numbered takes on the current wordings
    Rephrase,
}

/// Creative oracle answering from a script.
#[derive(Debug)]
pub struct ScriptedCreativeOracle {
    proposal: Proposal,
    failure: Option<OracleError>,
    leading_failures: Option<LeadingFailures>,
    calls: AtomicUsize,
    last_request: Mutex<Option<RewriteRequest>>,
}

impl ScriptedCreativeOracle {
    fn with_proposal(proposal: Proposal) -> Self {
        Self {
            proposal,
            failure: None,
            leading_failures: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always proposes `wordings` with `summary`.
    pub fn new<I, S>(summary: impl Into<String>, wordings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_proposal(Proposal::Fixed(NewMessageWordings {
            summary: summary.into(),
            wordings: wordings.into_iter().map(Into::into).collect(),
        }))
    }

    /// Proposes a new take on each current wording, for dry runs.
    pub fn rephrasing() -> Self {
        Self::with_proposal(Proposal::Rephrase)
    }

    /// Every call fails with `error`.
    #[must_use]
    pub fn failing_with(mut self, error: OracleError) -> Self {
        self.failure = Some(error);
        self
    }

    #[must_use]
    pub fn failing_first(mut self, count: u32, error: OracleError) -> Self {
        self.leading_failures = Some(LeadingFailures {
            remaining: AtomicU32::new(count),
            error,
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RewriteRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl CreativeOracle for ScriptedCreativeOracle {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<NewMessageWordings, OracleError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if let Some(err) = self.leading_failures.as_ref().and_then(LeadingFailures::take) {
            return Err(err);
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        match &self.proposal {
            Proposal::Fixed(wordings) => Ok(wordings.clone()),
            Proposal::Rephrase => Ok(NewMessageWordings {
                summary: format!("Round {call}: sharpen the strongest wordings"),
                wordings: request
                    .current_wordings
                    .iter()
                    .take(request.max_variants)
                    .map(|w| format!("{} (take {})", base_wording(w), call + 1))
                    .collect(),
            }),
        }
    }
}

/// Wording without a previous " (take n)" suffix.
fn base_wording(wording: &str) -> &str {
    match wording.rfind(" (take ") {
        Some(idx) if wording.ends_with(')') => &wording[..idx],
        _ => wording,
    }
}
