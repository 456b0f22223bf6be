/// Project service: validation in front of storage
///
/// Every write goes through `validate_schema`, so a stored project document
/// always has intact references.

use crate::project::storage::ProjectStorage;
use crate::project::types::{now, NewProject, Owner, Project, ProjectPatch, ProjectSummary};
use crate::schema::canvas::{apply_moves, NodeMove};
use crate::schema::defaults::new_id;
use crate::schema::{validate_schema, ValidationReport};
use thiserror::Error;

pub const MAX_PROJECT_NAME_CHARS: usize = 120;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Invalid project name: {0}")]
    InvalidName(String),

    #[error("Schema validation failed with {} issue(s)", .0.issues.len())]
    Invalid(ValidationReport),

    #[error("Unknown canvas nodes: {}", .0.join(", "))]
    UnknownNodes(Vec<String>),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(Debug, Clone)]
pub struct ProjectService {
    storage: ProjectStorage,
}

impl ProjectService {
    pub fn new(storage: ProjectStorage) -> Self {
        Self { storage }
    }

    pub async fn create(&self, owner: &Owner, new_project: NewProject) -> ProjectResult<Project> {
        let (name, schema) = new_project.into_schema();
        let name = normalize_name(&name)?;
        ensure_valid(&schema)?;

        let timestamp = now();
        let mut project = Project {
            id: new_id(),
            name,
            schema,
            created_at: timestamp,
            updated_at: timestamp,
            user_id: None,
            workspace_id: None,
        };
        project.set_owner(owner);
        self.storage.insert(&project).await?;

        tracing::info!("📐 Created project {} ({}) for {}", project.id, project.name, owner);
        Ok(project)
    }

    pub async fn get(&self, owner: &Owner, id: &str) -> ProjectResult<Project> {
        self.storage
            .get(owner, id)
            .await?
            .ok_or_else(|| ProjectError::NotFound(id.to_string()))
    }

    pub async fn list(&self, owner: &Owner) -> ProjectResult<Vec<ProjectSummary>> {
        Ok(self.storage.list(owner).await?)
    }

    /// Apply a partial update; the merged document must validate
    pub async fn update(&self, owner: &Owner, id: &str, patch: ProjectPatch) -> ProjectResult<Project> {
        let mut project = self.get(owner, id).await?;
        if patch.is_empty() {
            return Ok(project);
        }

        patch.apply(&mut project);
        project.name = normalize_name(&project.name)?;
        self.store_revision(owner, project).await
    }

    /// Write canvas node moves back into a stored project
    pub async fn move_nodes(&self, owner: &Owner, id: &str, moves: &[NodeMove]) -> ProjectResult<Project> {
        let mut project = self.get(owner, id).await?;
        let unknown = apply_moves(&mut project.schema, moves);
        if !unknown.is_empty() {
            return Err(ProjectError::UnknownNodes(unknown));
        }
        self.store_revision(owner, project).await
    }

    /// Copy a project under a new id in the same owner scope
    pub async fn duplicate(&self, owner: &Owner, id: &str) -> ProjectResult<Project> {
        let source = self.get(owner, id).await?;
        let mut name = format!("{} (copy)", source.name);
        if name.chars().count() > MAX_PROJECT_NAME_CHARS {
            name = name.chars().take(MAX_PROJECT_NAME_CHARS).collect();
        }

        let timestamp = now();
        let mut copy = Project {
            id: new_id(),
            name,
            schema: source.schema,
            created_at: timestamp,
            updated_at: timestamp,
            user_id: None,
            workspace_id: None,
        };
        copy.set_owner(owner);
        self.storage.insert(&copy).await?;

        tracing::info!("📑 Duplicated project {} into {} for {}", id, copy.id, owner);
        Ok(copy)
    }

    pub async fn delete(&self, owner: &Owner, id: &str) -> ProjectResult<()> {
        if self.storage.delete(owner, id).await? {
            tracing::info!("🗑️ Deleted project {} for {}", id, owner);
            Ok(())
        } else {
            Err(ProjectError::NotFound(id.to_string()))
        }
    }

    async fn store_revision(&self, owner: &Owner, mut project: Project) -> ProjectResult<Project> {
        ensure_valid(&project.schema)?;
        project.updated_at = now().max(project.created_at);

        if !self.storage.save(owner, &project).await? {
            return Err(ProjectError::NotFound(project.id));
        }
        tracing::debug!("Saved project {} revision at {}", project.id, project.updated_at);
        Ok(project)
    }
}

fn ensure_valid(schema: &crate::schema::Schema) -> ProjectResult<()> {
    let report = validate_schema(schema);
    if report.is_valid() {
        Ok(())
    } else {
        tracing::debug!("Rejected schema with {} issue(s)", report.issues.len());
        Err(ProjectError::Invalid(report))
    }
}

fn normalize_name(name: &str) -> ProjectResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProjectError::InvalidName("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_CHARS {
        return Err(ProjectError::InvalidName(format!(
            "name must be at most {MAX_PROJECT_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
