//! Messages, their wordings, and the positioning under test.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A logical message to be evaluated, such as "smoking is bad".
///
/// Immutable for the lifetime of a session: evolution only changes wordings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Id of the message, shared by all of its variants
    pub id: String,
    /// Semantic content of the message
    pub content: String,
    /// What the message should achieve in the reader's mind
    pub objective: String,
    /// Form the message is delivered in, e.g. "a poster slogan"
    #[serde(default)]
    pub deliverable: String,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        objective: impl Into<String>,
        deliverable: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            objective: objective.into(),
            deliverable: deliverable.into(),
        }
    }

    /// Prompt context describing this message for a creative.
    pub fn contribution(&self) -> String {
        format!(
            "MESSAGE: {}\nOBJECTIVE: {}\nDELIVERABLE: {}\n",
            self.content, self.objective, self.deliverable
        )
    }
}

/// Particular wording of a message.
///
/// Two variants are equal when they express the same message (by id) with
/// the same wording.
#[derive(Debug, Clone)]
pub struct MessageVariant {
    pub message: Arc<Message>,
    pub wording: String,
}

impl MessageVariant {
    pub fn new(message: Arc<Message>, wording: impl Into<String>) -> Self {
        Self {
            message,
            wording: wording.into(),
        }
    }
}

impl PartialEq for MessageVariant {
    fn eq(&self, other: &Self) -> bool {
        self.message.id == other.message.id && self.wording == other.wording
    }
}

impl Eq for MessageVariant {}

impl std::hash::Hash for MessageVariant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.message.id.hash(state);
        self.wording.hash(state);
    }
}

impl fmt::Display for MessageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.wording, self.message.id)
    }
}

/// All wordings currently under test for one message.
#[derive(Debug, Clone)]
pub struct MessageVariants {
    pub message: Arc<Message>,
    pub expressions: Vec<MessageVariant>,
}

impl MessageVariants {
    /// Wrap each wording as a variant of `message`, preserving order.
    pub fn new<I, S>(message: Arc<Message>, wordings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expressions = wordings
            .into_iter()
            .map(|w| MessageVariant::new(Arc::clone(&message), w))
            .collect();
        Self {
            message,
            expressions,
        }
    }

    pub fn wordings(&self) -> Vec<String> {
        self.expressions.iter().map(|e| e.wording.clone()).collect()
    }
}

/// The full set of messages and wordings tested in one iteration.
#[derive(Debug, Clone)]
pub struct Positioning {
    pub message_variants: Vec<MessageVariants>,
}

impl Positioning {
    pub fn new(message_variants: Vec<MessageVariants>) -> Self {
        Self { message_variants }
    }

    pub fn single(message_variants: MessageVariants) -> Self {
        Self::new(vec![message_variants])
    }

    /// Every variant across all messages, in positioning order.
    pub fn variants(&self) -> impl Iterator<Item = &MessageVariant> {
        self.message_variants
            .iter()
            .flat_map(|mv| mv.expressions.iter())
    }

    pub fn variant_count(&self) -> usize {
        self.message_variants
            .iter()
            .map(|mv| mv.expressions.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nosmoke() -> Arc<Message> {
        Arc::new(Message::new(
            "nosmoke",
            "smoking is bad",
            "deter the reader from smoking",
            "poster",
        ))
    }

    #[test]
    fn test_variant_equality_by_message_id_and_wording() {
        let a = MessageVariant::new(nosmoke(), "Smoking is uncool");
        let b = MessageVariant::new(nosmoke(), "Smoking is uncool");
        let c = MessageVariant::new(nosmoke(), "Winners don't smoke");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let other = Arc::new(Message::new("vape", "vaping is bad", "deter", "poster"));
        assert_ne!(a, MessageVariant::new(other, "Smoking is uncool"));
    }

    #[test]
    fn test_message_variants_share_message() {
        let message = nosmoke();
        let variants = MessageVariants::new(Arc::clone(&message), ["A", "B", "C"]);
        assert_eq!(variants.expressions.len(), 3);
        assert!(variants
            .expressions
            .iter()
            .all(|e| Arc::ptr_eq(&e.message, &message)));
        assert_eq!(variants.wordings(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_positioning_flattens_in_order() {
        let first = MessageVariants::new(nosmoke(), ["A", "B"]);
        let second = MessageVariants::new(
            Arc::new(Message::new("vape", "vaping is bad", "deter", "poster")),
            ["C"],
        );
        let positioning = Positioning::new(vec![first, second]);
        let wordings: Vec<&str> = positioning.variants().map(|v| v.wording.as_str()).collect();
        assert_eq!(wordings, vec!["A", "B", "C"]);
        assert_eq!(positioning.variant_count(), 3);
    }
}
