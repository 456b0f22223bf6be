/// SQLite persistence layer for workspaces and their members

use crate::project::types::{format_timestamp, parse_timestamp};
use crate::workspace::types::{Workspace, WorkspaceMember, WorkspaceMembership, WorkspaceRole};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnection, SqlitePool},
    Row,
};

/// Outcome of a membership write that must keep an owner in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberChange {
    Applied,
    NotMember,
    LastOwner,
}

#[derive(Debug, Clone)]
pub struct WorkspaceStorage {
    pool: SqlitePool,
}

impl WorkspaceStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a workspace and make `owner_user_id` its owner, atomically
    pub async fn create(&self, workspace: &Workspace, owner_user_id: &str) -> Result<()> {
        let created_at = format_timestamp(&workspace.created_at);
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO workspaces (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&workspace.id)
            .bind(&workspace.name)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO workspace_members (workspace_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&workspace.id)
        .bind(owner_user_id)
        .bind(WorkspaceRole::Owner.as_str())
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Workspace>> {
        let row = sqlx::query("SELECT id, name, created_at FROM workspaces WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let created_at: String = row.get("created_at");
                Ok(Some(Workspace {
                    id: row.get("id"),
                    name: row.get("name"),
                    created_at: parse_timestamp(&created_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// Workspaces the user belongs to, oldest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<WorkspaceMembership>> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.name, w.created_at, m.role
            FROM workspaces w
            JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = ?
            ORDER BY w.created_at, w.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut workspaces = Vec::with_capacity(rows.len());
        for row in rows {
            let created_at: String = row.get("created_at");
            let role: String = row.get("role");
            workspaces.push(WorkspaceMembership {
                workspace: Workspace {
                    id: row.get("id"),
                    name: row.get("name"),
                    created_at: parse_timestamp(&created_at)?,
                },
                role: role.parse()?,
            });
        }
        Ok(workspaces)
    }

    /// Role of a user in a workspace, `None` when not a member
    pub async fn role_of(&self, workspace_id: &str, user_id: &str) -> Result<Option<WorkspaceRole>> {
        let mut conn = self.pool.acquire().await?;
        member_role(&mut *conn, workspace_id, user_id).await
    }

    pub async fn members(&self, workspace_id: &str) -> Result<Vec<WorkspaceMember>> {
        let rows = sqlx::query(
            "SELECT user_id, role, joined_at FROM workspace_members \
             WHERE workspace_id = ? ORDER BY joined_at, user_id",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            let role: String = row.get("role");
            let joined_at: String = row.get("joined_at");
            members.push(WorkspaceMember {
                user_id: row.get("user_id"),
                role: role.parse()?,
                joined_at: parse_timestamp(&joined_at)?,
            });
        }
        Ok(members)
    }

    /// Add a member or change an existing member's role
    ///
    /// Demoting the only owner is refused. The check and the write share one
    /// `BEGIN IMMEDIATE` transaction, so concurrent changes see each other.
    pub async fn upsert_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
        joined_at: &DateTime<Utc>,
    ) -> Result<MemberChange> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        if role == WorkspaceRole::Member
            && member_role(&mut *tx, workspace_id, user_id).await? == Some(WorkspaceRole::Owner)
            && owner_count(&mut *tx, workspace_id).await? <= 1
        {
            tx.rollback().await?;
            return Ok(MemberChange::LastOwner);
        }

        sqlx::query(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role, joined_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(workspace_id, user_id) DO UPDATE SET role = excluded.role
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(format_timestamp(joined_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(MemberChange::Applied)
    }

    /// Remove a member unless they are the workspace's only owner
    pub async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<MemberChange> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let change = match member_role(&mut *tx, workspace_id, user_id).await? {
            None => MemberChange::NotMember,
            Some(role) => {
                if role == WorkspaceRole::Owner && owner_count(&mut *tx, workspace_id).await? <= 1 {
                    MemberChange::LastOwner
                } else {
                    sqlx::query("DELETE FROM workspace_members WHERE workspace_id = ? AND user_id = ?")
                        .bind(workspace_id)
                        .bind(user_id)
                        .execute(&mut *tx)
                        .await?;
                    MemberChange::Applied
                }
            }
        };

        if change == MemberChange::Applied {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(change)
    }

    /// Delete a workspace; members and projects go with it (FK cascade)
    pub async fn delete(&self, workspace_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = ?")
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn member_role(
    conn: &mut SqliteConnection,
    workspace_id: &str,
    user_id: &str,
) -> Result<Option<WorkspaceRole>> {
    let role: Option<String> = sqlx::query_scalar(
        "SELECT role FROM workspace_members WHERE workspace_id = ? AND user_id = ?",
    )
    .bind(workspace_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    role.map(|role| role.parse()).transpose()
}

async fn owner_count(conn: &mut SqliteConnection, workspace_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM workspace_members WHERE workspace_id = ? AND role = 'owner'",
    )
    .bind(workspace_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}
