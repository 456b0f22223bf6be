/// Project management module
///
/// Handles persistence of schema designs scoped by owner (user or workspace).
/// All projects and workspaces live in one database: {data_dir}/schemaway.db

pub mod database;
pub mod service;
pub mod storage;
pub mod types;

pub use database::DatabaseManager;
pub use service::{ProjectError, ProjectService};
pub use storage::ProjectStorage;
pub use types::{NewProject, Owner, Project, ProjectPatch, ProjectSummary};
