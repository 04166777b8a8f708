//! Message adapter: inbound envelope -> conversation service -> outbound envelope.
//!
//! Every failure is logged with its kind and collapsed into the fallback envelope, so the
//! caller always receives a well-formed reply.

use crate::config::LexConfig;
use crate::envelope::{InboundEnvelope, OutboundEnvelope};
use crate::event::AdapterEvent;
use crate::service::{ConversationRequest, ConversationService, ServiceError};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request format: {0}")]
    InvalidRequest(&'static str),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AdapterError {
    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Decode(_) => "decode",
            AdapterError::InvalidRequest(_) => "invalid_request",
            AdapterError::Service(_) => "service",
        }
    }
}

/// Bot the adapter talks to (name + alias), fixed for the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotTarget {
    pub name: String,
    pub alias: String,
}

impl From<&LexConfig> for BotTarget {
    fn from(lex: &LexConfig) -> Self {
        Self {
            name: lex.bot_name.clone(),
            alias: lex.bot_alias.clone(),
        }
    }
}

/// Shared adapter: holds the service client created at start-up.
#[derive(Clone)]
pub struct Adapter {
    service: Arc<dyn ConversationService>,
    bot: BotTarget,
}

impl Adapter {
    pub fn new(service: Arc<dyn ConversationService>, bot: BotTarget) -> Self {
        Self { service, bot }
    }

    /// Handle one event. Never fails: errors become the fallback envelope.
    pub async fn handle(&self, event: &Value) -> OutboundEnvelope {
        log::info!("received event: {}", pretty(event));
        match self.try_handle(event).await {
            Ok(out) => out,
            Err(e) => {
                log::error!("adapter: {} error: {}", e.kind(), e);
                OutboundEnvelope::fallback()
            }
        }
    }

    /// Handle one event, surfacing the failure.
    pub async fn try_handle(&self, event: &Value) -> Result<OutboundEnvelope, AdapterError> {
        let event = AdapterEvent::new(event);
        let body = event.body().to_value()?;
        log::info!("parsed request body: {}", pretty(&body));
        let request = InboundEnvelope::deserialize(&body)?;

        let input_text = request
            .first_text()
            .ok_or(AdapterError::InvalidRequest("first message has no unstructured text"))?;
        if input_text.is_empty() {
            return Err(AdapterError::InvalidRequest("message text is empty"));
        }

        let user_id = event.caller().session_key();
        log::info!("using userId: {}", user_id);

        let call = ConversationRequest {
            bot_name: self.bot.name.clone(),
            bot_alias: self.bot.alias.clone(),
            user_id,
            input_text: input_text.to_string(),
        };
        let reply = self.service.post_text(&call).await?;
        log::info!(
            "lex response: message={:?} intent={:?} dialogState={:?}",
            reply.message,
            reply.intent_name,
            reply.dialog_state
        );

        Ok(OutboundEnvelope::from_reply(reply.message.as_deref()))
    }
}

fn pretty(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}
