//! Credo - user management API with RS256 access tokens

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LogFormat, LoggingConfig, Overrides};
use credo_api::{AppState, MutationPolicy, create_router};
use credo_auth::{Argon2Hasher, BasicCredentials, CredentialHasher, TokenIssuer, TokenVerifier};
use credo_core::{AuthService, UserService};
use credo_db::{Database, UserStore};

/// Credo - user management API with RS256 access tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "CREDO_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "CREDO_PORT")]
    port: Option<u16>,

    /// PEM-encoded RSA private key, used instead of auth.private_key_path
    #[arg(long, env = "CREDO_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// PEM-encoded RSA public key, used instead of auth.public_key_path
    #[arg(long, env = "CREDO_PUBLIC_KEY", hide_env_values = true)]
    public_key: Option<String>,

    /// Username accepted by basic-auth protected routes
    #[arg(long, env = "CREDO_BASIC_AUTH_USERNAME")]
    basic_auth_username: Option<String>,

    /// Password accepted by basic-auth protected routes
    #[arg(long, env = "CREDO_BASIC_AUTH_PASSWORD", hide_env_values = true)]
    basic_auth_password: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind.clone(),
            port: self.port,
            private_key: self.private_key.clone(),
            public_key: self.public_key.clone(),
            basic_auth_username: self.basic_auth_username.clone(),
            basic_auth_password: self.basic_auth_password.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    config.apply_overrides(args.overrides());
    config.validate()?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Credo v{}", env!("CARGO_PKG_VERSION"));

    // Key problems are fatal
    let issuer = TokenIssuer::from_rsa_pem(&config.auth.private_key()?)
        .inspect_err(|e| error!("Invalid RSA private key: {}", e))
        .context("Failed to parse RSA private key")?;
    let verifier = TokenVerifier::from_rsa_pem(&config.auth.public_key()?)
        .inspect_err(|e| error!("Invalid RSA public key: {}", e))
        .context("Failed to parse RSA public key")?;

    // Initialize database
    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database_url(), config.database.max_connections).await?;
    let store: Arc<dyn UserStore> = Arc::new(db);

    // Initialize services
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());
    let auth = AuthService::new(store.clone(), hasher.clone(), Arc::new(issuer))?;
    let users = UserService::new(store, hasher);

    let policy = config.auth.mutation_policy;
    if policy == MutationPolicy::Open {
        warn!("User create, update and delete endpoints are open to unauthenticated callers (auth.mutation_policy = \"open\")");
    }

    // Create application state
    let state = AppState::new(
        auth,
        users,
        Arc::new(verifier),
        BasicCredentials::new(
            config.auth.basic_auth_username.clone(),
            config.auth.basic_auth_password.clone(),
        ),
        policy,
    );

    // Install the Prometheus recorder
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Create router
    let app = create_router(
        state,
        Some(Arc::new(metrics_handle)),
        Duration::from_secs(config.server.request_timeout_secs),
    )
    .layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);
    info!("Mutation policy: {}", policy.as_str());

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
