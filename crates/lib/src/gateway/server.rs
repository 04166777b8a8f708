//! Gateway HTTP server: health probe and the chat endpoint.

use crate::adapter::{Adapter, BotTarget};
use crate::config::{self, Config};
use crate::envelope::OutboundEnvelope;
use crate::event::proxy_event;
use crate::service::{ConversationService, LexClient};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

const SERVICE_NAME: &str = "concierge";

/// Shared state for the gateway (config and the adapter built at start-up).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub adapter: Arc<Adapter>,
}

/// Run the gateway with the Lex client from config; binds to server.bind:server.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_server(config: Config) -> Result<()> {
    let lex = config::resolve_lex(&config);
    let service = Arc::new(LexClient::from_config(&lex).await);
    run_server_with(config, service).await
}

/// Run the gateway with the given conversation service.
pub async fn run_server_with(
    config: Config,
    service: Arc<dyn ConversationService>,
) -> Result<()> {
    let bot = BotTarget::from(&config.lex);
    log::info!("adapter: bot {} alias {}", bot.name, bot.alias);
    let state = GatewayState {
        config: Arc::new(config.clone()),
        adapter: Arc::new(Adapter::new(service, bot)),
    };

    let app = router(state, &config.server.path);

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!(
        "gateway listening on {} (chat endpoint {})",
        bind_addr,
        config.server.path
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

fn router(state: GatewayState, chat_path: &str) -> Router {
    let chat_path = if chat_path.starts_with('/') {
        chat_path.to_string()
    } else {
        format!("/{}", chat_path)
    };
    Router::new()
        .route("/", get(health_http))
        .route(&chat_path, post(chat_http))
        .with_state(state)
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "service": SERVICE_NAME,
        "port": state.config.server.port,
    }))
}

/// POST chat endpoint — wraps the body and caller address into a proxy event for the adapter.
/// Always 200: failures are already folded into the fallback envelope.
async fn chat_http(
    State(state): State<GatewayState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<OutboundEnvelope> {
    let source_ip = if state.config.server.trust_forwarded_for {
        forwarded_for(&headers).unwrap_or_else(|| peer.ip().to_string())
    } else {
        peer.ip().to_string()
    };
    let body = match String::from_utf8(body.to_vec()) {
        Ok(text) => text,
        Err(e) => {
            log::error!("adapter: decode error: request body is not UTF-8: {}", e);
            return Json(OutboundEnvelope::fallback());
        }
    };
    let event = proxy_event(body, Some(source_ip));
    Json(state.adapter.handle(&event).await)
}

/// First address in X-Forwarded-For, if any.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(forwarded_for(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn forwarded_for_absent_or_blank() {
        let mut headers = HeaderMap::new();
        assert_eq!(forwarded_for(&headers), None);
        headers.insert("X-Forwarded-For", HeaderValue::from_static(" "));
        assert_eq!(forwarded_for(&headers), None);
    }
}
