use clap::{Parser, Subcommand};
use concierge::adapter::{Adapter, BotTarget};
use concierge::service::LexClient;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Concierge chat adapter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: CONCIERGE_CONFIG_PATH or ~/.concierge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the HTTP gateway (health on `/`, chat messages on the configured path).
    Serve {
        /// Config file path (default: CONCIERGE_CONFIG_PATH or ~/.concierge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Serve invocations inside the Lambda function runtime.
    Lambda {
        /// Config file path (default: CONCIERGE_CONFIG_PATH or ~/.concierge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Send one message through the adapter and print the reply envelope.
    Send {
        /// Config file path (default: CONCIERGE_CONFIG_PATH or ~/.concierge/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Caller address used for the session key (default: web-user session).
        #[arg(long, value_name = "IP")]
        source_ip: Option<String>,

        /// Message text.
        text: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Some(Commands::Serve { .. }) | Some(Commands::Lambda { .. }) => "info",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Some(Commands::Version) => {
            println!("concierge {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Lambda { config }) => {
            if let Err(e) = run_lambda(config).await {
                log::error!("lambda failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            config,
            source_ip,
            text,
        }) => {
            if let Err(e) = run_send(config, source_ip, text).await {
                log::error!("send failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(concierge::config::default_config_path);
    let dir = concierge::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = concierge::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.server.bind,
        config.server.port,
        path.display()
    );
    concierge::gateway::run_server(config).await
}

async fn run_lambda(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, _) = concierge::config::load_config(config_path)?;
    concierge::lambda::run_lambda(config).await
}

async fn run_send(
    config_path: Option<std::path::PathBuf>,
    source_ip: Option<String>,
    text: String,
) -> anyhow::Result<()> {
    let (config, _) = concierge::config::load_config(config_path)?;
    let lex = concierge::config::resolve_lex(&config);
    let service = Arc::new(LexClient::from_config(&lex).await);
    let adapter = Adapter::new(service, BotTarget::from(&lex));

    let mut event = serde_json::json!({
        "messages": [{ "type": "unstructured", "unstructured": { "text": text } }]
    });
    if let Some(ip) = source_ip {
        event["requestContext"] = serde_json::json!({ "identity": { "sourceIp": ip } });
    }

    let reply = adapter.try_handle(&event).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
