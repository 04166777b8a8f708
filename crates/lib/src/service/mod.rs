//! Conversation service: the external bot that understands the text and writes the reply.
//!
//! The adapter talks to it through [`ConversationService`]; [`LexClient`] is the Amazon Lex
//! implementation used in production.

mod lex;

pub use lex::LexClient;

use async_trait::async_trait;

/// One text turn for the conversation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRequest {
    pub bot_name: String,
    pub bot_alias: String,
    /// Session key correlating turns from the same caller.
    pub user_id: String,
    pub input_text: String,
}

/// Reply from the conversation service. Only `message` reaches the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationReply {
    pub message: Option<String>,
    pub intent_name: Option<String>,
    pub dialog_state: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("conversation service request failed: {0}")]
    Request(String),
}

/// External conversational service.
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Send the user's text and wait for the bot's reply.
    async fn post_text(&self, request: &ConversationRequest)
        -> Result<ConversationReply, ServiceError>;
}
