/// SQLite persistence layer for projects
///
/// Projects are stored as a JSON document (the schema) next to indexed
/// metadata columns. Every query is scoped by owner: a project is invisible
/// outside the user or workspace that owns it.

use crate::project::types::{format_timestamp, parse_timestamp, Owner, Project, ProjectSummary};
use crate::schema::{Engine, Schema};
use anyhow::Result;
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    Row,
};

/// SQLite-based project storage
#[derive(Debug, Clone)]
pub struct ProjectStorage {
    pool: SqlitePool,
}

/// WHERE fragment and bind value restricting rows to one owner
fn owner_scope(owner: &Owner) -> (&'static str, &str) {
    match owner {
        Owner::User(id) => ("user_id = ? AND workspace_id IS NULL", id),
        Owner::Workspace(id) => ("workspace_id = ?", id),
    }
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new project; owner comes from the project's own fields
    pub async fn insert(&self, project: &Project) -> Result<()> {
        if project.owner().is_none() {
            anyhow::bail!("Project {} has no owner", project.id);
        }
        let document = serde_json::to_string(&project.schema)?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, name, engine, document, user_id, workspace_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(project.engine().as_str())
        .bind(&document)
        .bind(&project.user_id)
        .bind(&project.workspace_id)
        .bind(format_timestamp(&project.created_at))
        .bind(format_timestamp(&project.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieve a project by ID within an owner scope
    pub async fn get(&self, owner: &Owner, id: &str) -> Result<Option<Project>> {
        let (scope, owner_id) = owner_scope(owner);
        let row = sqlx::query(&format!(
            "SELECT id, name, document, user_id, workspace_id, created_at, updated_at \
             FROM projects WHERE id = ? AND {scope}"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| project_from_row(&row)).transpose()
    }

    /// List an owner's projects, most recently updated first
    pub async fn list(&self, owner: &Owner) -> Result<Vec<ProjectSummary>> {
        let (scope, owner_id) = owner_scope(owner);
        let rows = sqlx::query(&format!(
            "SELECT id, name, engine, created_at, updated_at, \
                    COALESCE(json_array_length(document, '$.tables'), 0) AS table_count \
             FROM projects WHERE {scope} ORDER BY updated_at DESC, id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            let engine: String = row.get("engine");
            let created_at: String = row.get("created_at");
            let updated_at: String = row.get("updated_at");
            projects.push(ProjectSummary {
                id: row.get("id"),
                name: row.get("name"),
                engine: engine.parse::<Engine>()?,
                table_count: row.get("table_count"),
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            });
        }

        Ok(projects)
    }

    /// Overwrite name, document and updated_at of an existing project
    ///
    /// Returns false when no project with that id exists in the owner scope.
    /// `created_at` and ownership are never changed.
    pub async fn save(&self, owner: &Owner, project: &Project) -> Result<bool> {
        let (scope, owner_id) = owner_scope(owner);
        let document = serde_json::to_string(&project.schema)?;

        let result = sqlx::query(&format!(
            "UPDATE projects SET name = ?, engine = ?, document = ?, updated_at = ? \
             WHERE id = ? AND {scope}"
        ))
        .bind(&project.name)
        .bind(project.engine().as_str())
        .bind(&document)
        .bind(format_timestamp(&project.updated_at))
        .bind(&project.id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a project by ID within an owner scope
    pub async fn delete(&self, owner: &Owner, id: &str) -> Result<bool> {
        let (scope, owner_id) = owner_scope(owner);
        let result = sqlx::query(&format!("DELETE FROM projects WHERE id = ? AND {scope}"))
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let document: String = row.get("document");
    let schema: Schema = serde_json::from_str(&document)?;
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Project {
        id: row.get("id"),
        name: row.get("name"),
        schema,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        user_id: row.get("user_id"),
        workspace_id: row.get("workspace_id"),
    })
}
