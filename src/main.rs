//! ReviewFlow API - PR Review Platform
//!
//! Tracks teams, users and pull requests, and automates reviewer
//! selection: two reviewers picked at creation, single reviewer
//! replacement on request, and bulk replacement when a whole team is
//! deactivated.

use reviewflow_api::config::Settings;
use reviewflow_api::db;
use reviewflow_api::routes::create_router;
use reviewflow_api::service::ReviewService;
use reviewflow_api::state::AppState;
use reviewflow_api::store::PgStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting ReviewFlow - PR Review Platform...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    // Build the pool and bootstrap the schema - REQUIRED, no in-memory fallback
    let pool = db::create_pool(&settings.database)?;
    if let Err(e) = db::init_schema(&pool).await {
        error!("❌ FATAL: Failed to initialize database: {}", e);
        return Err(e);
    }
    info!("✅ Database pool created successfully");

    let store = Arc::new(PgStore::new(pool));
    let service = ReviewService::new(store.clone(), store);
    let state = Arc::new(AppState::new(service));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   POST /team/add             - Create a team with members");
    info!("   GET  /team/get             - Fetch a team roster");
    info!("   POST /team/bulkDeactivate  - Deactivate a team, reassign its reviews");
    info!("   POST /users/setIsActive    - Flip a user's active flag");
    info!("   GET  /users/getReview      - PRs a user reviews");
    info!("   POST /pullRequest/create   - Open a PR with auto-assigned reviewers");
    info!("   POST /pullRequest/merge    - Merge a PR (idempotent)");
    info!("   POST /pullRequest/reassign - Replace one reviewer");
    info!("   GET  /stats                - Assignment statistics");
    info!("   GET  /health               - Store connectivity probe");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reviewflow_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
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
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
