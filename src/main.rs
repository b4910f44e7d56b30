use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crosstalk::api::{self, ApiContext};
use crosstalk::factcheck::{FactCheckConfig, FactCheckProvider};
use crosstalk::state::{self, AppState};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crosstalk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Crosstalk...");

    // Initialize the fact-check collaborator
    let factcheck_config = FactCheckConfig::from_env();
    let fact_checker: Option<Arc<dyn FactCheckProvider>> = match factcheck_config.build() {
        Ok(provider) => {
            tracing::info!("Fact-check provider initialized");
            Some(Arc::new(provider))
        }
        Err(e) => {
            tracing::warn!("Fact checking disabled: {}", e);
            None
        }
    };

    let app_state = AppState::new();

    // Spawn background task for reclaiming idle lobbies
    state::spawn_eviction_sweeper(app_state.clone());

    let app = api::router(ApiContext {
        state: app_state,
        fact_checker,
    })
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], 7878));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
