//! Conversation message types for Palaver.
//!
//! A [`Message`] is one turn in the conversation, authored by the user or
//! the bot. Messages are created once through the constructors below and are
//! never edited afterwards; the store only ever appends or clears them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::llm::{CompletionResponse, InstructionRole, TokenUsage};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// The remote-model role this sender maps to.
    pub fn role(self) -> InstructionRole {
        match self {
            Sender::User => InstructionRole::User,
            Sender::Bot => InstructionRole::Assistant,
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single entry in the conversation history.
///
/// Persisted as camelCase JSON inside the history slot. `usage`, `model`
/// and `system_fingerprint` are only ever set on successful bot messages;
/// `is_error` only on failed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

impl Message {
    /// A user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content.into(), Sender::User)
    }

    /// A successful bot reply carrying the completion's metadata.
    pub fn bot(response: &CompletionResponse) -> Self {
        Self {
            usage: response.usage.clone(),
            model: response.model.clone(),
            system_fingerprint: response.system_fingerprint.clone(),
            ..Self::new(response.content.clone(), Sender::Bot)
        }
    }

    /// A bot message standing in for a failed completion.
    pub fn bot_error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(content.into(), Sender::Bot)
        }
    }

    fn new(content: String, sender: Sender) -> Self {
        Self {
            id: Uuid::now_v7(),
            content,
            sender,
            timestamp: Utc::now(),
            is_error: false,
            usage: None,
            model: None,
            system_fingerprint: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Check the invariants every constructor upholds.
    ///
    /// Only messages read back from storage can fail this.
    pub fn validate(&self) -> Result<(), &'static str> {
        let has_metadata =
            self.usage.is_some() || self.model.is_some() || self.system_fingerprint.is_some();

        if self.is_user() && self.is_error {
            return Err("user message marked as error");
        }
        if self.is_user() && self.content.trim().is_empty() {
            return Err("empty user message");
        }
        if has_metadata && (self.is_user() || self.is_error) {
            return Err("completion metadata outside a successful bot reply");
        }
        Ok(())
    }

    /// Copy of this message with its timestamp raised to at least `floor`.
    ///
    /// Keeps timestamps non-decreasing in append order when the wall clock
    /// steps backwards between two messages.
    pub fn not_before(mut self, floor: DateTime<Utc>) -> Self {
        if self.timestamp < floor {
            self.timestamp = floor;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionTokensDetails;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Bot] {
            let parsed: Sender = sender.to_string().parse().unwrap();
            assert_eq!(sender, parsed);
        }
    }

    #[test]
    fn test_sender_role_mapping() {
        assert_eq!(Sender::User.role(), InstructionRole::User);
        assert_eq!(Sender::Bot.role(), InstructionRole::Assistant);
    }

    #[test]
    fn test_user_message_has_no_bot_metadata() {
        let msg = Message::user("hello");
        assert!(msg.is_user());
        assert!(!msg.is_error);
        assert!(msg.usage.is_none());
        assert!(msg.model.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Message::user("a");
        let b = Message::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_bot_message_copies_metadata() {
        let response = CompletionResponse {
            content: "hi there".to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 3,
                completion_tokens: 2,
                total_tokens: 5,
                completion_tokens_details: None,
            }),
            model: Some("gpt-4-turbo".to_string()),
            system_fingerprint: Some("fp_123".to_string()),
        };
        let msg = Message::bot(&response);
        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.content, "hi there");
        assert_eq!(msg.usage.unwrap().total_tokens, 5);
        assert_eq!(msg.model.as_deref(), Some("gpt-4-turbo"));
        assert_eq!(msg.system_fingerprint.as_deref(), Some("fp_123"));
    }

    #[test]
    fn test_bot_error_message() {
        let msg = Message::bot_error("Sorry");
        assert_eq!(msg.sender, Sender::Bot);
        assert!(msg.is_error);
        assert!(msg.usage.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let msg = Message::bot_error("oops");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["isError"], true);
        assert_eq!(json["sender"], "bot");
        assert!(json.get("usage").is_none());
        assert!(json.get("systemFingerprint").is_none());
    }

    #[test]
    fn test_deserializes_without_is_error() {
        let json = r#"{
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "content": "I'm Alex",
            "sender": "user",
            "timestamp": "2025-01-01T10:00:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(!msg.is_error);
        assert!(msg.is_user());
    }

    #[test]
    fn test_usage_details_survive_roundtrip() {
        let response = CompletionResponse {
            content: "x".to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 1,
                completion_tokens: 1,
                total_tokens: 2,
                completion_tokens_details: Some(CompletionTokensDetails {
                    reasoning_tokens: 7,
                    accepted_prediction_tokens: 0,
                    rejected_prediction_tokens: 1,
                }),
            }),
            model: None,
            system_fingerprint: None,
        };
        let msg = Message::bot(&response);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"reasoningTokens\":7"));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_constructed_messages_validate() {
        assert!(Message::user("hi").validate().is_ok());
        assert!(Message::bot(&CompletionResponse::text("")).validate().is_ok());
        assert!(Message::bot_error("Sorry").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_broken_entries() {
        let mut user_error = Message::user("hi");
        user_error.is_error = true;
        assert_eq!(user_error.validate(), Err("user message marked as error"));

        assert_eq!(Message::user("  ").validate(), Err("empty user message"));

        let mut user_with_model = Message::user("hi");
        user_with_model.model = Some("gpt".to_string());
        assert!(user_with_model.validate().is_err());

        let mut error_with_usage = Message::bot_error("Sorry");
        error_with_usage.usage = Some(TokenUsage::default());
        assert!(error_with_usage.validate().is_err());
    }

    #[test]
    fn test_not_before_raises_earlier_timestamp() {
        let later = Utc::now() + chrono::Duration::seconds(60);
        let msg = Message::user("x").not_before(later);
        assert_eq!(msg.timestamp, later);

        let earlier = Utc::now() - chrono::Duration::seconds(60);
        let msg = Message::user("y");
        let ts = msg.timestamp;
        assert_eq!(msg.not_before(earlier).timestamp, ts);
    }
}
