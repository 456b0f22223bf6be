/// Workspace module
///
/// Team ownership for projects: workspaces, their members and roles.

pub mod service;
pub mod storage;
pub mod types;

pub use service::{WorkspaceDetails, WorkspaceError, WorkspaceService};
pub use storage::{MemberChange, WorkspaceStorage};
pub use types::{Workspace, WorkspaceMember, WorkspaceMembership, WorkspaceRole};
