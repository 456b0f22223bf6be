/// Schemaway: backend for visual database schema design
///
/// Main entry point for the Schemaway server. Initializes configuration and starts
/// the HTTP server with project, schema and workspace endpoints.

use schemaway::{config::Config, server::start_server};

/// Application entry point
///
/// Initializes the server with environment-driven configuration and starts listening.
/// The server provides:
/// - Project management API at /api/projects/*
/// - Schema validation and canvas derivation at /api/schema/*
/// - Workspaces at /api/workspaces/* and the caller at /api/me
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3004 and ./data)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
