/// HTTP API Layer
///
/// This module provides the REST API endpoints for schema design projects.
/// It handles:
/// - Project CRUD scoped to the caller or one of their workspaces
/// - Canvas derivation and position updates
/// - Stateless schema validation and engine catalogs
/// - Workspace and membership management

use crate::{config::Config, project::ProjectService, workspace::WorkspaceService};
use std::sync::Arc;

// Error type and JSON error body
pub mod error;

// Project management endpoints (POST/GET/PUT/DELETE)
pub mod projects;

// Stateless schema endpoints (validation, canvas, engines)
pub mod schema;

// Workspace and membership endpoints
pub mod workspaces;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration (identity mode is read per request)
    pub config: Arc<Config>,
    /// Project persistence behind validation
    pub projects: ProjectService,
    /// Workspace membership rules
    pub workspaces: WorkspaceService,
}

// Re-export router builders
pub use projects::create_project_routes;
pub use schema::create_schema_routes;
pub use workspaces::create_workspace_routes;
