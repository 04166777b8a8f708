//! Amazon Lex runtime (v1) client: `PostText` for a text turn.
//! Credentials come from the standard AWS provider chain; region is fixed per process.

use super::{ConversationReply, ConversationRequest, ConversationService, ServiceError};
use crate::config::LexConfig;
use async_trait::async_trait;
use aws_sdk_lexruntime::error::DisplayErrorContext;

/// Client for the Lex runtime API. Build once at start-up and share.
#[derive(Clone)]
pub struct LexClient {
    client: aws_sdk_lexruntime::Client,
}

impl LexClient {
    /// Load AWS configuration for `region` (and optional endpoint override) and build the client.
    pub async fn new(region: &str, endpoint_url: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;
        log::info!(
            "lex client: region {}{}",
            region,
            endpoint_url
                .map(|u| format!(", endpoint {}", u))
                .unwrap_or_default()
        );
        Self {
            client: aws_sdk_lexruntime::Client::new(&sdk_config),
        }
    }

    /// Build from the `lex` config section; env overrides are applied by the caller.
    pub async fn from_config(lex: &LexConfig) -> Self {
        Self::new(&lex.region, lex.endpoint_url.as_deref()).await
    }
}

#[async_trait]
impl ConversationService for LexClient {
    async fn post_text(
        &self,
        request: &ConversationRequest,
    ) -> Result<ConversationReply, ServiceError> {
        let output = self
            .client
            .post_text()
            .bot_name(&request.bot_name)
            .bot_alias(&request.bot_alias)
            .user_id(&request.user_id)
            .input_text(&request.input_text)
            .send()
            .await
            .map_err(|e| ServiceError::Request(DisplayErrorContext(&e).to_string()))?;
        Ok(ConversationReply {
            message: output.message().map(str::to_string),
            intent_name: output.intent_name().map(str::to_string),
            dialog_state: output.dialog_state().map(|s| s.as_str().to_string()),
        })
    }
}
