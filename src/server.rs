/// Server setup and initialization
///
/// Wires together all components: database, project and workspace services,
/// and HTTP routes. Provides the main application factory for the Axum app.

use crate::{
    api::{create_project_routes, create_schema_routes, create_workspace_routes, AppState},
    config::Config,
    project::{DatabaseManager, ProjectService, ProjectStorage},
    workspace::{WorkspaceService, WorkspaceStorage},
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Create the main Axum application with all routes and middleware
///
/// Opens (or creates) the project database and builds the shared state.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("📁 Using data directory: {}", config.database.data_dir);
    let database = DatabaseManager::open(&config.database.data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open project database: {}", e))?;

    if config.auth.guest_mode {
        tracing::warn!(
            "👤 Guest mode enabled: all requests act as '{}'",
            config.auth.guest_user_id
        );
    }

    tracing::info!("🏗️ Creating application state");
    let state = AppState {
        config: Arc::new(config),
        projects: ProjectService::new(ProjectStorage::new(database.pool().clone())),
        workspaces: WorkspaceService::new(WorkspaceStorage::new(database.pool().clone())),
    };

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Project CRUD, canvas and positions
        .merge(create_project_routes())
        // Stateless validation, canvas and engine catalogs
        .merge(create_schema_routes())
        // Identity, workspaces and members
        .merge(create_workspace_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Schemaway server...");

    let bind_addr = config.bind_addr();
    let app = create_app(config).await?;

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
