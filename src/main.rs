mod common;
mod http_client;
mod model;
mod oauth;

use std::sync::Arc;

use clap::Parser;
use model::arg::Args;
use model::config::Config;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration: file first, environment overrides on top
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let config = Config::load(&config_path)
        .and_then(Config::apply_env)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to load config: {:#}", e);
            std::process::exit(1);
        });

    let handler = oauth::OAuthHandler::new(config.clone()).unwrap_or_else(|e| {
        tracing::error!("Invalid configuration: {:#}", e);
        std::process::exit(1);
    });
    let app = oauth::create_oauth_router(Arc::new(handler));

    tracing::info!(
        "GitHub client ID: {}",
        config.client_id().unwrap_or_default()
    );
    tracing::info!(
        "Allowed origins: {}",
        config.origin_allow_list().as_slice().join(", ")
    );
    if config.require_origin {
        tracing::info!("Origin is required on /auth");
    } else {
        tracing::warn!("Requests to /auth without an origin are accepted (requireOrigin=false)");
    }

    if let Some(path) = config.config_path() {
        tracing::debug!("Config file: {}", path.display());
    }

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting Decap CMS OAuth provider: {}", addr);
    tracing::info!("Available endpoints:");
    tracing::info!("  GET  /");
    tracing::info!("  GET  /auth");
    tracing::info!("  GET  /callback");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        tracing::error!("Failed to bind {}: {}", addr, e);
        std::process::exit(1);
    });
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
