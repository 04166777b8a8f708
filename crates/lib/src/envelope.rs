//! Message envelopes exchanged with the web chat client.
//!
//! Inbound: `{ "messages": [{ "unstructured": { "text": "..." } }] }`; only the first
//! message is consulted. Outbound: always exactly one message tagged `"unstructured"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply text when the conversation service answers without a message.
pub const PLACEHOLDER_TEXT: &str = "I'm still under development.";

/// Reply text for every failure (bad input, service error).
pub const FALLBACK_TEXT: &str = "Sorry, I encountered an error. Please try again.";

const UNSTRUCTURED: &str = "unstructured";

/// Request envelope sent by the chat client. Messages stay raw: only the first is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundEnvelope {
    #[serde(default)]
    pub messages: Vec<Value>,
}

impl InboundEnvelope {
    /// `messages[0].unstructured.text`, if it is a string.
    pub fn first_text(&self) -> Option<&str> {
        self.messages
            .first()
            .and_then(|m| m.get("unstructured"))
            .and_then(|u| u.get("text"))
            .and_then(Value::as_str)
    }
}

/// Response envelope returned to the chat client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundEnvelope {
    pub messages: Vec<OutboundMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub typ: String,
    pub unstructured: OutboundContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundContent {
    pub text: String,
}

impl OutboundEnvelope {
    /// Single unstructured message carrying `text`.
    pub fn unstructured(text: impl Into<String>) -> Self {
        Self {
            messages: vec![OutboundMessage {
                typ: UNSTRUCTURED.to_string(),
                unstructured: OutboundContent { text: text.into() },
            }],
        }
    }

    /// Wrap a service reply; a missing or empty reply becomes the placeholder.
    pub fn from_reply(reply: Option<&str>) -> Self {
        let text = reply.filter(|s| !s.is_empty()).unwrap_or(PLACEHOLDER_TEXT);
        Self::unstructured(text)
    }

    /// The fixed apology envelope returned on any failure.
    pub fn fallback() -> Self {
        Self::unstructured(FALLBACK_TEXT)
    }

    /// Text of the (single) outbound message.
    pub fn text(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.unstructured.text.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outbound_wire_shape() {
        let v = serde_json::to_value(OutboundEnvelope::unstructured("Hello!")).unwrap();
        assert_eq!(
            v,
            json!({ "messages": [{ "type": "unstructured", "unstructured": { "text": "Hello!" } }] })
        );
    }

    #[test]
    fn empty_reply_uses_placeholder() {
        assert_eq!(OutboundEnvelope::from_reply(None).text(), PLACEHOLDER_TEXT);
        assert_eq!(OutboundEnvelope::from_reply(Some("")).text(), PLACEHOLDER_TEXT);
        assert_eq!(OutboundEnvelope::from_reply(Some("Hi")).text(), "Hi");
    }

    #[test]
    fn first_text_requires_unstructured_text() {
        let env: InboundEnvelope =
            serde_json::from_value(json!({ "messages": [{ "unstructured": {} }] })).unwrap();
        assert_eq!(env.first_text(), None);

        let env: InboundEnvelope = serde_json::from_value(json!({
            "messages": [
                { "type": "unstructured", "unstructured": { "text": "first" } },
                { "unstructured": { "text": "second" } }
            ]
        }))
        .unwrap();
        assert_eq!(env.first_text(), Some("first"));
    }

    #[test]
    fn only_first_message_is_read() {
        let env: InboundEnvelope = serde_json::from_value(json!({
            "messages": [{ "unstructured": { "text": "Hi" } }, 5, { "unstructured": { "text": 7 } }]
        }))
        .unwrap();
        assert_eq!(env.first_text(), Some("Hi"));

        let env: InboundEnvelope =
            serde_json::from_value(json!({ "messages": [{ "unstructured": { "text": 7 } }] }))
                .unwrap();
        assert_eq!(env.first_text(), None);
    }

    #[test]
    fn missing_messages_is_empty() {
        let env: InboundEnvelope = serde_json::from_value(json!({ "other": 1 })).unwrap();
        assert!(env.messages.is_empty());
        assert_eq!(env.first_text(), None);
    }
}
