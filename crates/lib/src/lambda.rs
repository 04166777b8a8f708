//! Function runtime entry: serve Lambda invocations with one adapter per process.

use crate::adapter::{Adapter, BotTarget};
use crate::config::{self, Config};
use crate::envelope::OutboundEnvelope;
use crate::service::LexClient;
use anyhow::Result;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

/// Build the Lex client and adapter once, then answer invocations until the runtime stops.
pub async fn run_lambda(config: Config) -> Result<()> {
    let lex = config::resolve_lex(&config);
    let service = Arc::new(LexClient::from_config(&lex).await);
    let adapter = Arc::new(Adapter::new(service, BotTarget::from(&lex)));
    log::info!("lambda: bot {} alias {}", lex.bot_name, lex.bot_alias);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let adapter = adapter.clone();
        async move {
            log::debug!("lambda: request id {}", event.context.request_id);
            Ok::<OutboundEnvelope, lambda_runtime::Error>(adapter.handle(&event.payload).await)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("lambda runtime: {}", e))
}
