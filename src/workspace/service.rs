/// Workspace service: membership rules on top of storage
///
/// Only owners manage members or delete a workspace, and a workspace always
/// keeps at least one owner.

use crate::project::types::now;
use crate::schema::defaults::new_id;
use crate::workspace::storage::{MemberChange, WorkspaceStorage};
use crate::workspace::types::{Workspace, WorkspaceMember, WorkspaceMembership, WorkspaceRole};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Workspace not found: {0}")]
    NotFound(String),

    #[error("Invalid workspace name: {0}")]
    InvalidName(String),

    #[error("Invalid member: {0}")]
    InvalidMember(String),

    #[error("User {user_id} is not a member of workspace {workspace_id}")]
    NotMember { workspace_id: String, user_id: String },

    #[error("Only workspace owners can {0}")]
    OwnerRequired(&'static str),

    #[error("Cannot remove the last owner of workspace {0}")]
    LastOwner(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Workspace details visible to members
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDetails {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub role: WorkspaceRole,
    pub members: Vec<WorkspaceMember>,
}

#[derive(Debug, Clone)]
pub struct WorkspaceService {
    storage: WorkspaceStorage,
}

impl WorkspaceService {
    pub fn new(storage: WorkspaceStorage) -> Self {
        Self { storage }
    }

    pub async fn create(&self, user_id: &str, name: &str) -> WorkspaceResult<WorkspaceMembership> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::InvalidName("name must not be empty".to_string()));
        }

        let workspace = Workspace {
            id: new_id(),
            name: name.to_string(),
            created_at: now(),
        };
        self.storage.create(&workspace, user_id).await?;

        tracing::info!("👥 Created workspace {} ({}) owned by {}", workspace.id, workspace.name, user_id);
        Ok(WorkspaceMembership {
            workspace,
            role: WorkspaceRole::Owner,
        })
    }

    pub async fn list_for_user(&self, user_id: &str) -> WorkspaceResult<Vec<WorkspaceMembership>> {
        Ok(self.storage.list_for_user(user_id).await?)
    }

    /// Role of a member; non-members of existing workspaces get `NotMember`
    pub async fn require_member(&self, workspace_id: &str, user_id: &str) -> WorkspaceResult<WorkspaceRole> {
        if let Some(role) = self.storage.role_of(workspace_id, user_id).await? {
            return Ok(role);
        }
        if self.storage.get(workspace_id).await?.is_none() {
            return Err(WorkspaceError::NotFound(workspace_id.to_string()));
        }
        Err(WorkspaceError::NotMember {
            workspace_id: workspace_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub async fn details(&self, workspace_id: &str, user_id: &str) -> WorkspaceResult<WorkspaceDetails> {
        let role = self.require_member(workspace_id, user_id).await?;
        let workspace = self
            .storage
            .get(workspace_id)
            .await?
            .ok_or_else(|| WorkspaceError::NotFound(workspace_id.to_string()))?;
        let members = self.storage.members(workspace_id).await?;

        Ok(WorkspaceDetails {
            workspace,
            role,
            members,
        })
    }

    /// Add a member or change a member's role (owners only)
    pub async fn add_member(
        &self,
        workspace_id: &str,
        acting_user_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> WorkspaceResult<Vec<WorkspaceMember>> {
        self.require_owner(workspace_id, acting_user_id, "manage members").await?;
        if user_id.trim().is_empty() {
            return Err(WorkspaceError::InvalidMember("user id must not be empty".to_string()));
        }

        let change = self
            .storage
            .upsert_member(workspace_id, user_id, role, &now())
            .await?;
        if change == MemberChange::LastOwner {
            return Err(WorkspaceError::LastOwner(workspace_id.to_string()));
        }
        tracing::info!("➕ {} set {} as {} of workspace {}", acting_user_id, user_id, role.as_str(), workspace_id);
        Ok(self.storage.members(workspace_id).await?)
    }

    /// Remove a member; returns false when the user was not a member
    ///
    /// Owners may remove anyone, members only themselves.
    pub async fn remove_member(
        &self,
        workspace_id: &str,
        acting_user_id: &str,
        user_id: &str,
    ) -> WorkspaceResult<bool> {
        if acting_user_id == user_id {
            self.require_member(workspace_id, acting_user_id).await?;
        } else {
            self.require_owner(workspace_id, acting_user_id, "manage members").await?;
        }

        match self.storage.remove_member(workspace_id, user_id).await? {
            MemberChange::Applied => {
                tracing::info!("➖ {} removed {} from workspace {}", acting_user_id, user_id, workspace_id);
                Ok(true)
            }
            MemberChange::NotMember => Ok(false),
            MemberChange::LastOwner => Err(WorkspaceError::LastOwner(workspace_id.to_string())),
        }
    }

    /// Delete a workspace and all of its projects (owners only)
    pub async fn delete(&self, workspace_id: &str, acting_user_id: &str) -> WorkspaceResult<()> {
        self.require_owner(workspace_id, acting_user_id, "delete the workspace").await?;
        if !self.storage.delete(workspace_id).await? {
            return Err(WorkspaceError::NotFound(workspace_id.to_string()));
        }
        tracing::info!("🗑️ Workspace {} deleted by {}", workspace_id, acting_user_id);
        Ok(())
    }

    async fn require_owner(&self, workspace_id: &str, user_id: &str, action: &'static str) -> WorkspaceResult<()> {
        match self.require_member(workspace_id, user_id).await? {
            WorkspaceRole::Owner => Ok(()),
            WorkspaceRole::Member => Err(WorkspaceError::OwnerRequired(action)),
        }
    }
}
