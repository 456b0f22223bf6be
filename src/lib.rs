/// Schemaway: backend for visual database schema design
///
/// This library provides the schema data model (tables, columns, relations,
/// groups, notes), its derived canvas representation, and the project
/// persistence API with per-user or per-workspace ownership.

// Core configuration and setup
pub mod config;

// Schema design layer - data model, defaults, validation and canvas derivation
pub mod schema;

// Project management layer - owner-scoped persistence of schema designs
pub mod project;

// Workspace layer - team ownership and membership rules
pub mod workspace;

// Identity and owner-context resolution for requests
pub mod access;

// HTTP API layer - REST endpoints for projects, schemas and workspaces
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use project::{Owner, Project, ProjectService};
pub use schema::{Canvas, Engine, Schema};
pub use server::{create_app, start_server};
