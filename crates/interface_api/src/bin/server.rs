//! Claims Pipeline - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_COMPLETION_PROVIDER` - "anthropic" or "openai"; unset disables the
//!   model-assisted paths and the pipeline runs on rule-based fallbacks
//! * `API_COMPLETION_MODEL` / `API_COMPLETION_API_KEY` / `API_COMPLETION_API_URL`
//! * `API_COMPLETION_TIMEOUT_SECS` - per-call bound (default: 30)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::ports::CompletionService;
use domain_claims::{ClaimService, RouterConfig};
use infra_db::repositories::{ClaimsRepository, InvestigatorRepository};
use infra_llm::{build_completion_service, CompletionConfig};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting claims pipeline API server"
    );

    let pool = infra_db::create_pool_from_url(&config.database_url).await?;
    infra_db::run_migrations(&pool).await?;

    let claims = Arc::new(ClaimsRepository::new(pool.clone()));
    let investigators = Arc::new(InvestigatorRepository::new(pool.clone()));
    investigators.seed().await?;

    let completion = build_completion(&config)?;
    let service = Arc::new(ClaimService::new(
        claims,
        investigators,
        completion,
        RouterConfig::default(),
    ));

    let app = create_router(AppState::new(service));
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables, falling back to
/// defaults where unset.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| ApiConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("API_DATABASE_URL"))
            .unwrap_or_else(|_| "postgres://localhost/claims".to_string()),
        log_level: std::env::var("API_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string()),
        completion_provider: std::env::var("API_COMPLETION_PROVIDER").ok(),
        completion_model: std::env::var("API_COMPLETION_MODEL").ok(),
        completion_api_key: std::env::var("API_COMPLETION_API_KEY").ok(),
        completion_api_url: std::env::var("API_COMPLETION_API_URL").ok(),
        completion_timeout_secs: std::env::var("API_COMPLETION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30),
    })
}

/// Builds the completion client when a provider is configured. A configured
/// provider with broken settings is a startup error; no provider at all
/// means the stage agents run on their deterministic fallbacks.
fn build_completion(config: &ApiConfig) -> anyhow::Result<Option<Arc<dyn CompletionService>>> {
    let Some(provider) = config.completion_provider.clone() else {
        tracing::warn!("no completion provider configured; using rule-based fallbacks");
        return Ok(None);
    };

    let completion_config = CompletionConfig {
        provider,
        model: config
            .completion_model
            .clone()
            .unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
        api_key: config.completion_api_key.clone(),
        api_url: config.completion_api_url.clone(),
        temperature: Some(0.0),
        max_tokens: None,
        timeout_secs: config.completion_timeout_secs,
    };

    let client = build_completion_service(&completion_config)?;
    Ok(Some(client))
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), enabling graceful
/// shutdown so in-flight requests complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
