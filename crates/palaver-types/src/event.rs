//! Session events for incremental rendering.
//!
//! Published by the session controller whenever the conversation changes so
//! the presentation layer can redraw only what moved.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Position of the session controller's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Submitting,
}

/// Something observable happened in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A message was appended to the store.
    MessageAppended { message: Message },

    /// The controller moved between Idle and Submitting.
    StateChanged { state: SessionState },

    /// History and remembered name were erased.
    Cleared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_tagged_serialization() {
        let event = SessionEvent::StateChanged {
            state: SessionState::Submitting,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "state_changed");
        assert_eq!(json["state"], "submitting");
    }

    #[test]
    fn test_cleared_event_serialization() {
        let json = serde_json::to_string(&SessionEvent::Cleared).unwrap();
        assert_eq!(json, r#"{"type":"cleared"}"#);
    }
}
