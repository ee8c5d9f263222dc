//! Inbound and outbound bot activities.
//!
//! Field names follow the Bot Framework activity JSON (`type`, `from.id`,
//! `code`) so a channel connector can post activities unchanged.

use serde::{Deserialize, Serialize};

/// Code attached to the end-of-conversation activity.
pub const COMPLETED_SUCCESSFULLY: &str = "completedSuccessfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Message,
    EndOfConversation,
    /// Any other channel activity (`conversationUpdate`, `typing`, ...).
    #[serde(other)]
    Other,
}

/// The sender of an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Activity {
    /// Inbound message from `user_id`.
    pub fn message_from(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: ActivityType::Message,
            text: Some(text.into()),
            from: Some(ChannelAccount { id: user_id.into() }),
            code: None,
        }
    }

    /// Outbound text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ActivityType::Message,
            text: Some(text.into()),
            from: None,
            code: None,
        }
    }

    pub fn end_of_conversation() -> Self {
        Self {
            kind: ActivityType::EndOfConversation,
            text: None,
            from: None,
            code: Some(COMPLETED_SUCCESSFULLY.to_string()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.from.as_ref().map(|f| f.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_wire_shape() {
        let activity: Activity = serde_json::from_value(json!({
            "type": "message",
            "text": "hello",
            "from": {"id": "user-1", "name": "ignored"},
            "channelId": "emulator"
        }))
        .unwrap();
        assert_eq!(activity, Activity::message_from("user-1", "hello"));
    }

    #[test]
    fn test_unknown_activity_types_are_accepted() {
        let activity: Activity = serde_json::from_value(json!({
            "type": "conversationUpdate",
            "from": {"id": "u1"},
            "membersAdded": [{"id": "u1"}]
        }))
        .unwrap();
        assert_eq!(activity.kind, ActivityType::Other);
        assert_eq!(activity.user_id(), Some("u1"));
    }

    #[test]
    fn test_end_of_conversation_wire_shape() {
        let json = serde_json::to_value(Activity::end_of_conversation()).unwrap();
        assert_eq!(
            json,
            json!({"type": "endOfConversation", "code": "completedSuccessfully"})
        );
    }
}
