//! Inbound event as delivered by the function runtime (API Gateway proxy shape) or by
//! a direct invocation, and the caller identity derived from it.

use crate::envelope::InboundEnvelope;
use serde::Deserialize;
use serde_json::{json, Value};

/// Identity used when the event carries no source address.
const WEB_USER: &str = "web-user";

/// Where the request envelope lives in an event.
#[derive(Debug, Clone, Copy)]
pub enum RequestBody<'a> {
    /// Proxy integration: `body` is the JSON envelope encoded as a string.
    Encoded(&'a str),
    /// Direct invocation: the event itself is the envelope.
    Inline(&'a Value),
}

impl<'a> RequestBody<'a> {
    /// The request object as JSON, before it is read as an envelope.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            RequestBody::Encoded(text) => serde_json::from_str(text),
            RequestBody::Inline(value) => Ok((*value).clone()),
        }
    }

    pub fn decode(&self) -> Result<InboundEnvelope, serde_json::Error> {
        InboundEnvelope::deserialize(&self.to_value()?)
    }
}

/// Borrowed view over a raw event.
#[derive(Debug, Clone, Copy)]
pub struct AdapterEvent<'a> {
    raw: &'a Value,
}

impl<'a> AdapterEvent<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    pub fn body(&self) -> RequestBody<'a> {
        match self.raw.get("body") {
            Some(Value::String(text)) => RequestBody::Encoded(text),
            _ => RequestBody::Inline(self.raw),
        }
    }

    /// `requestContext.identity.sourceIp`, when present and non-empty.
    pub fn source_ip(&self) -> Option<&'a str> {
        self.raw
            .pointer("/requestContext/identity/sourceIp")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn caller(&self) -> CallerIdentity {
        CallerIdentity::from_source_ip(self.source_ip())
    }
}

/// Build a proxy-shaped event from an HTTP body and the caller's address.
pub fn proxy_event(body: String, source_ip: Option<String>) -> Value {
    let mut event = json!({ "body": body });
    if let Some(ip) = source_ip {
        event["requestContext"] = json!({ "identity": { "sourceIp": ip } });
    }
    event
}

/// Caller identity derived per request; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerIdentity {
    /// Sanitized source address (`.` and `:` replaced by `-`).
    SourceIp(String),
    WebUser,
}

impl CallerIdentity {
    pub fn from_source_ip(source_ip: Option<&str>) -> Self {
        match source_ip {
            Some(ip) if !ip.is_empty() => CallerIdentity::SourceIp(sanitize_address(ip)),
            _ => CallerIdentity::WebUser,
        }
    }

    /// Session key for the conversation service: `user-` + identity.
    pub fn session_key(&self) -> String {
        format!("user-{}", self)
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallerIdentity::SourceIp(ip) => write!(f, "ip-{}", ip),
            CallerIdentity::WebUser => f.write_str(WEB_USER),
        }
    }
}

fn sanitize_address(ip: &str) -> String {
    ip.replace(['.', ':'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_session_key() {
        let id = CallerIdentity::from_source_ip(Some("192.168.1.1"));
        assert_eq!(id.to_string(), "ip-192-168-1-1");
        assert_eq!(id.session_key(), "user-ip-192-168-1-1");
    }

    #[test]
    fn ipv6_session_key() {
        let id = CallerIdentity::from_source_ip(Some("2001:db8::1"));
        assert_eq!(id.session_key(), "user-ip-2001-db8--1");
    }

    #[test]
    fn missing_or_empty_source_is_web_user() {
        assert_eq!(CallerIdentity::from_source_ip(None).session_key(), "user-web-user");
        assert_eq!(CallerIdentity::from_source_ip(Some("")), CallerIdentity::WebUser);
    }

    #[test]
    fn string_body_is_encoded() {
        let raw = json!({ "body": "{\"messages\":[]}" });
        let event = AdapterEvent::new(&raw);
        assert!(matches!(event.body(), RequestBody::Encoded(_)));
        assert!(event.body().decode().unwrap().messages.is_empty());
    }

    #[test]
    fn encoded_body_keeps_unknown_fields_in_value() {
        let raw = json!({ "body": "{\"messages\":[],\"clientVersion\":\"2.1\"}" });
        let value = AdapterEvent::new(&raw).body().to_value().unwrap();
        assert_eq!(value["clientVersion"], "2.1");
    }

    #[test]
    fn object_body_falls_back_to_event() {
        let raw = json!({
            "body": { "messages": [{ "unstructured": { "text": "ignored" } }] },
            "messages": [{ "unstructured": { "text": "direct" } }]
        });
        let envelope = AdapterEvent::new(&raw).body().decode().unwrap();
        assert_eq!(envelope.first_text(), Some("direct"));
    }

    #[test]
    fn source_ip_from_request_context() {
        let raw = proxy_event("{}".to_string(), Some("10.0.0.7".to_string()));
        let event = AdapterEvent::new(&raw);
        assert_eq!(event.source_ip(), Some("10.0.0.7"));
        assert_eq!(event.caller().session_key(), "user-ip-10-0-0-7");

        let raw = proxy_event("{}".to_string(), None);
        assert_eq!(AdapterEvent::new(&raw).source_ip(), None);
    }
}
