//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.concierge/config.json`) and environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Local HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Lex bot and region.
    #[serde(default)]
    pub lex: LexConfig,
}

/// HTTP server bind, port, and route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 8080).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,

    /// Route that accepts chat messages (default "/chatbot").
    #[serde(default = "default_server_path")]
    pub path: String,

    /// Use the first X-Forwarded-For address as the caller address (behind a proxy).
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_server_port() -> u16 {
    8080
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_server_path() -> String {
    "/chatbot".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
            path: default_server_path(),
            trust_forwarded_for: false,
        }
    }
}

/// Lex runtime settings. Bot name and alias are fixed for the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexConfig {
    /// AWS region of the bot. Overridden by CONCIERGE_LEX_REGION env.
    #[serde(default = "default_lex_region")]
    pub region: String,

    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    #[serde(default = "default_bot_alias")]
    pub bot_alias: String,

    /// Custom runtime endpoint (e.g. a local stack). Overridden by CONCIERGE_LEX_ENDPOINT_URL env.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn default_lex_region() -> String {
    "us-east-1".to_string()
}

fn default_bot_name() -> String {
    "DiningConcierge".to_string()
}

fn default_bot_alias() -> String {
    "DiningConcierge".to_string()
}

impl Default for LexConfig {
    fn default() -> Self {
        Self {
            region: default_lex_region(),
            bot_name: default_bot_name(),
            bot_alias: default_bot_alias(),
            endpoint_url: None,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve the Lex region: env CONCIERGE_LEX_REGION overrides config.
pub fn resolve_lex_region(config: &Config) -> String {
    env_non_empty("CONCIERGE_LEX_REGION").unwrap_or_else(|| config.lex.region.trim().to_string())
}

/// Resolve the Lex endpoint override: env CONCIERGE_LEX_ENDPOINT_URL overrides config.
pub fn resolve_lex_endpoint_url(config: &Config) -> Option<String> {
    env_non_empty("CONCIERGE_LEX_ENDPOINT_URL").or_else(|| configured_endpoint_url(&config.lex))
}

/// Endpoint override from the config file alone: trimmed, blank => None.
fn configured_endpoint_url(lex: &LexConfig) -> Option<String> {
    lex.endpoint_url
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lex section with env overrides applied.
pub fn resolve_lex(config: &Config) -> LexConfig {
    LexConfig {
        region: resolve_lex_region(config),
        endpoint_url: resolve_lex_endpoint_url(config),
        ..config.lex.clone()
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CONCIERGE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".concierge").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or CONCIERGE_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.server.port, 8080);
        assert_eq!(c.server.bind, "127.0.0.1");
        assert_eq!(c.server.path, "/chatbot");
        assert!(!c.server.trust_forwarded_for);
        assert_eq!(c.lex.region, "us-east-1");
        assert_eq!(c.lex.bot_name, "DiningConcierge");
        assert_eq!(c.lex.bot_alias, "DiningConcierge");
        assert!(c.lex.endpoint_url.is_none());
    }

    #[test]
    fn parses_camel_case_and_fills_defaults() {
        let c: Config = serde_json::from_str(
            r#"{ "server": { "port": 9000, "trustForwardedFor": true }, "lex": { "botAlias": "Prod" } }"#,
        )
        .unwrap();
        assert_eq!(c.server.port, 9000);
        assert!(c.server.trust_forwarded_for);
        assert_eq!(c.server.path, "/chatbot");
        assert_eq!(c.lex.bot_alias, "Prod");
        assert_eq!(c.lex.bot_name, "DiningConcierge");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir()
            .join("concierge-config-test-missing")
            .join("config.json");
        let (c, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(c.server.port, 8080);
    }

    #[test]
    fn configured_endpoint_is_trimmed_and_blank_ignored() {
        let mut lex = LexConfig::default();
        assert_eq!(configured_endpoint_url(&lex), None);
        lex.endpoint_url = Some("  ".to_string());
        assert_eq!(configured_endpoint_url(&lex), None);
        lex.endpoint_url = Some(" http://localhost:4566 ".to_string());
        assert_eq!(
            configured_endpoint_url(&lex).as_deref(),
            Some("http://localhost:4566")
        );
    }
}
