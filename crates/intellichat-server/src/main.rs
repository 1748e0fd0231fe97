//! Web server binary for the IntelliChat assistant.
//!
//! Loads configuration, builds the hosted-model clients, and serves the
//! chat surface over HTTP until a shutdown signal arrives. A missing API
//! credential ends the process here, before the server binds.

use anyhow::Result;
use clap::Parser;
use intellichat_core::llm::openai;
use intellichat_core::rag::embeddings;
use intellichat_core::ChatConfig;
use intellichat_server::{shutdown_signal, ChatServer, ServerConfig};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "IntelliChat server - chat assistant over HTTP")]
struct Cli {
    #[clap(long, short, help = "Path to a YAML configuration file")]
    config: Option<std::path::PathBuf>,

    #[clap(long, default_value = "127.0.0.1:3000")]
    bind_addr: String,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Comma-separated list of allowed CORS origins")]
    cors_origins: Option<String>,

    #[clap(long, default_value = "16777216", help = "Maximum upload size in bytes")]
    max_body_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let config = match &cli.config {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            ChatConfig::from_file(path)?
        }
        None => ChatConfig::default(),
    };

    // Client construction resolves credentials; without them the process
    // exits right here.
    let model = openai::create_client(&config.llm)?;
    let embedder = embeddings::create_embedder(&config.embeddings)?;
    log::info!(
        "assistant '{}' ready (model {}, embeddings {})",
        config.assistant.name,
        config.llm.model,
        config.embeddings.model
    );

    let mut server_config = ServerConfig::default()
        .with_bind_addr_str(&cli.bind_addr)?
        .with_max_body_size(cli.max_body_size);
    if let Some(origins) = &cli.cors_origins {
        let origins: Vec<String> = origins.split(',').map(|s| s.trim().to_string()).collect();
        server_config = server_config.with_cors_origins(origins);
    }

    let server = ChatServer::with_config(model, embedder, config.session_options(), server_config);

    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        log::error!("Server failed: {}", e);
        return Err(e.into());
    }

    log::info!("chat server shut down gracefully");
    Ok(())
}
