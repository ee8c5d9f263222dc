//! Per-user conversation context.
//!
//! An append-only log of turn records keyed by user id. The whole history is
//! rendered into the next prompt as-is; nothing is truncated or summarized, so
//! prompt size grows with the conversation.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sentiment::SentimentResult;

/// One accumulated record in a user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnRecord {
    /// Raw inbound text.
    Message { text: String },
    /// Inbound text with its sentiment score.
    Sentiment { text: String, result: SentimentResult },
    Feedback { text: String },
    EthicalDecision { text: String },
    EmotionalResponse { text: String },
    Action { text: String },
    Explanation { text: String },
}

impl TurnRecord {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    pub fn feedback(text: impl Into<String>) -> Self {
        Self::Feedback { text: text.into() }
    }

    pub fn explanation(text: impl Into<String>) -> Self {
        Self::Explanation { text: text.into() }
    }
}

impl fmt::Display for TurnRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message { text } => write!(f, "{}", text),
            Self::Sentiment { text, result } => write!(f, "{} [sentiment: {}]", text, result),
            Self::Feedback { text } => write!(f, "feedback: {}", text),
            Self::EthicalDecision { text } => write!(f, "ethical decision: {}", text),
            Self::EmotionalResponse { text } => write!(f, "emotional response: {}", text),
            Self::Action { text } => write!(f, "action: {}", text),
            Self::Explanation { text } => write!(f, "explanation: {}", text),
        }
    }
}

/// Mapping from user id to that user's ordered turn records.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    turns: HashMap<String, Vec<TurnRecord>>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, creating the user's history on first use.
    pub fn append(&mut self, user_id: &str, record: TurnRecord) {
        self.turns.entry(user_id.to_string()).or_default().push(record);
    }

    /// Make sure the user has a (possibly empty) history.
    pub fn ensure(&mut self, user_id: &str) {
        self.turns.entry(user_id.to_string()).or_default();
    }

    /// The user's full history in append order; empty if unknown.
    pub fn get(&self, user_id: &str) -> &[TurnRecord] {
        self.turns.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop the user's history. Returns what was removed.
    pub fn remove(&mut self, user_id: &str) -> Option<Vec<TurnRecord>> {
        self.turns.remove(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.turns.contains_key(user_id)
    }

    /// Number of users with a history.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Single-line rendering of the user's history for prompts.
    pub fn render(&self, user_id: &str) -> String {
        let items: Vec<String> = self.get(user_id).iter().map(ToString::to_string).collect();
        format!("[{}]", items.join("; "))
    }
}

/// Whether inbound text asks to end the conversation.
///
/// Case-sensitive substring match on "end" or "stop", so "weekend" and
/// "unstoppable" also end the conversation.
pub fn is_end_request(text: &str) -> bool {
    text.contains("end") || text.contains("stop")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{IntensityScores, SentimentResult};

    #[test]
    fn test_get_returns_appends_in_order() {
        let mut ctx = ConversationContext::new();
        let records: Vec<TurnRecord> = (0..5)
            .map(|i| TurnRecord::message(format!("message {}", i)))
            .collect();
        for r in &records {
            ctx.append("user123", r.clone());
        }
        assert_eq!(ctx.get("user123"), records.as_slice());
    }

    #[test]
    fn test_users_are_isolated() {
        let mut ctx = ConversationContext::new();
        ctx.append("a", TurnRecord::message("hi"));
        ctx.append("b", TurnRecord::feedback("meh"));
        ctx.append("a", TurnRecord::explanation("because"));
        assert_eq!(ctx.get("a").len(), 2);
        assert_eq!(ctx.get("b"), &[TurnRecord::feedback("meh")]);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_remove_then_get_is_empty() {
        let mut ctx = ConversationContext::new();
        ctx.append("u", TurnRecord::message("hello"));
        let removed = ctx.remove("u").unwrap();
        assert_eq!(removed.len(), 1);
        assert!(ctx.get("u").is_empty());
        assert!(!ctx.contains("u"));
        assert!(ctx.remove("u").is_none());
    }

    #[test]
    fn test_unknown_user_is_empty() {
        let ctx = ConversationContext::new();
        assert!(ctx.get("nobody").is_empty());
        assert_eq!(ctx.render("nobody"), "[]");
    }

    #[test]
    fn test_render() {
        let mut ctx = ConversationContext::new();
        ctx.append("u", TurnRecord::message("hello"));
        ctx.append(
            "u",
            TurnRecord::Sentiment {
                text: "great".into(),
                result: SentimentResult::Intensity(IntensityScores {
                    neg: 0.0,
                    neu: 0.0,
                    pos: 1.0,
                    compound: 0.6249,
                }),
            },
        );
        ctx.append("u", TurnRecord::feedback("more examples"));
        assert_eq!(
            ctx.render("u"),
            "[hello; great [sentiment: neg=0.000, neu=0.000, pos=1.000, compound=0.6249]; feedback: more examples]"
        );
    }

    #[test]
    fn test_end_request_is_case_sensitive_substring() {
        assert!(is_end_request("please end this"));
        assert!(is_end_request("stop"));
        assert!(is_end_request("see you next weekend"));
        assert!(!is_end_request("END"));
        assert!(!is_end_request("Stop"));
        assert!(!is_end_request("hello there"));
    }

    #[test]
    fn test_record_serialization_is_tagged() {
        let json = serde_json::to_value(TurnRecord::feedback("x")).unwrap();
        assert_eq!(json["kind"], "feedback");
        assert_eq!(json["text"], "x");
    }
}
