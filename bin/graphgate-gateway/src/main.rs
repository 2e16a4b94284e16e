//! graphgate gateway - MS Graph API gateway
//!
//! Serves Graph users and drive items backed by the account directory and
//! the storage gateway.

use anyhow::{Context, Result};
use clap::Parser;
use graphgate_auth::{ClaimsQuery, RejectingVerifier};
use graphgate_client::{GrpcAccountDirectory, GrpcStorageGateway};
use graphgate_common::Config;
use graphgate_gateway::app;
use graphgate_gateway::auth_middleware::AuthState;
use graphgate_gateway::graph::GraphState;
use graphgate_proto::accounts::accounts_service_client::AccountsServiceClient;
use graphgate_proto::storage::storage_gateway_client::StorageGatewayClient;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "graphgate-gateway")]
#[command(about = "MS Graph API gateway")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "GRAPHGATE_CONFIG", default_value = "/etc/graphgate/gateway.toml")]
    config: String,

    /// Listen address for the HTTP API
    #[arg(short, long, env = "GRAPHGATE_LISTEN")]
    listen: Option<String>,

    /// Account directory service endpoint
    #[arg(long, env = "GRAPHGATE_ACCOUNTS_ENDPOINT")]
    accounts_endpoint: Option<String>,

    /// Storage gateway endpoint
    #[arg(long, env = "GRAPHGATE_STORAGE_ENDPOINT")]
    storage_endpoint: Option<String>,

    /// Log level
    #[arg(long, env = "GRAPHGATE_LOG_LEVEL")]
    log_level: Option<String>,
}

/// Load the config file if it exists, then apply CLI overrides
fn load_config(args: &Args) -> Result<Config> {
    let mut config: Config = if Path::new(&args.config).exists() {
        let config_str = std::fs::read_to_string(&args.config)
            .with_context(|| format!("Failed to read config file {}", args.config))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", args.config))?
    } else {
        Config::default()
    };

    if let Some(listen) = &args.listen {
        config.http.listen.clone_from(listen);
    }
    if let Some(endpoint) = &args.accounts_endpoint {
        config.accounts.endpoint.clone_from(endpoint);
    }
    if let Some(endpoint) = &args.storage_endpoint {
        config.storage.endpoint.clone_from(endpoint);
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting graphgate gateway");
    if !Path::new(&args.config).exists() {
        warn!("Config file {} not found, using defaults", args.config);
    }
    info!("Accounts endpoint: {}", config.accounts.endpoint);
    info!("Storage endpoint: {}", config.storage.endpoint);

    let accounts_client = AccountsServiceClient::connect(config.accounts.endpoint.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to account directory: {}", e))?;
    info!("Connected to account directory");

    let storage_client = StorageGatewayClient::connect(config.storage.endpoint.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to storage gateway: {}", e))?;
    info!("Connected to storage gateway");

    let directory = Arc::new(GrpcAccountDirectory::new(accounts_client));
    let storage = Arc::new(
        GrpcStorageGateway::new(storage_client, &config.storage.token_header)
            .map_err(|e| anyhow::anyhow!("Invalid storage configuration: {}", e))?,
    );

    let state = Arc::new(GraphState::new(
        directory,
        storage,
        ClaimsQuery::from(config.identity.clone()),
    ));

    // No identity provider is wired in; bearer tokens are rejected
    let verifier = Arc::new(RejectingVerifier);
    info!("Bearer token verifier: none (Basic authentication only)");
    let auth_state = Arc::new(AuthState::new(state.resolver.clone(), verifier));

    let router = app(state, auth_state, &config.http);

    let addr: SocketAddr = config
        .http
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", config.http.listen, e))?;

    info!(
        "Serving Graph API on {} under {}",
        addr,
        if config.http.root.is_empty() { "/" } else { config.http.root.as_str() }
    );

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        })
        .await?;

    info!("Gateway shut down gracefully");

    Ok(())
}
