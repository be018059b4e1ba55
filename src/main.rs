//! HealthAI Guardian Server
//!
//! Cardiovascular / hypertension risk prediction over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   HEALTHAI GUARDIAN                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────────┐  ┌────────────────────┐ │
//! │  │  API      │  │  Risk          │  │  Model Gateway     │ │
//! │  │  Gateway  │─▶│  Assessment    │─▶│  (ONNX Runtime)    │ │
//! │  │  (Axum)   │  │  (thresholds)  │  │  loaded at start   │ │
//! │  └───────────┘  └────────────────┘  └────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod model;
mod handlers;
mod middleware;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, LogFormat};
use model::{OnnxRiskModel, RiskModel, RiskThresholds};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    init_tracing(config.log_format);

    tracing::info!("HealthAI Guardian starting...");
    if config.is_production() && config.include_mock_wearable {
        tracing::warn!("Mock wearable data is attached to predictions in production");
    }

    // Model must be in place before any traffic is accepted
    let model = OnnxRiskModel::load(&config.model_path, &config.model_output_name)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;

    // Build application state
    let state = AppState {
        model: Arc::new(model),
        config: Arc::new(config.clone()),
        thresholds: RiskThresholds::default(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from((config.host, config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "healthai_guardian=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn RiskModel>,
    pub config: Arc<Config>,
    pub thresholds: RiskThresholds,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::check))
        .route("/wearables/mock", get(handlers::wearables::mock))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
