/// Project type definitions for user/workspace ownership
///
/// A project is a saved schema design plus its metadata. Every stored project
/// belongs to exactly one owner: a single user or a workspace.

use crate::schema::{Engine, GroupData, NoteData, Relation, Schema, TableData};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a project belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Personal project of a user
    User(String),
    /// Shared project of a workspace
    Workspace(String),
}

impl Owner {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Owner::User(id) => Some(id),
            Owner::Workspace(_) => None,
        }
    }

    pub fn workspace_id(&self) -> Option<&str> {
        match self {
            Owner::User(_) => None,
            Owner::Workspace(id) => Some(id),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::User(id) => write!(f, "user:{id}"),
            Owner::Workspace(id) => write!(f, "workspace:{id}"),
        }
    }
}

/// A saved schema design including diagram layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Engine and all diagram entities, flattened into the project JSON
    #[serde(flatten)]
    pub schema: Schema,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

impl Project {
    pub fn engine(&self) -> Engine {
        self.schema.engine
    }

    /// Owner recorded on the project, if it has been stored
    pub fn owner(&self) -> Option<Owner> {
        match (&self.user_id, &self.workspace_id) {
            (_, Some(workspace_id)) => Some(Owner::Workspace(workspace_id.clone())),
            (Some(user_id), None) => Some(Owner::User(user_id.clone())),
            (None, None) => None,
        }
    }

    pub fn set_owner(&mut self, owner: &Owner) {
        self.user_id = owner.user_id().map(str::to_string);
        self.workspace_id = owner.workspace_id().map(str::to_string);
    }
}

/// Listing row for a project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub engine: Engine,
    pub table_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project; omitted collections start empty
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub engine: Engine,
    #[serde(default)]
    pub tables: Vec<TableData>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub groups: Vec<GroupData>,
    #[serde(default)]
    pub notes: Vec<NoteData>,
}

impl NewProject {
    pub fn empty(name: impl Into<String>, engine: Engine) -> Self {
        Self {
            name: name.into(),
            engine,
            tables: Vec::new(),
            relations: Vec::new(),
            groups: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn into_schema(self) -> (String, Schema) {
        let schema = Schema {
            engine: self.engine,
            tables: self.tables,
            relations: self.relations,
            groups: self.groups,
            notes: self.notes,
        };
        (self.name, schema)
    }
}

/// Partial update; every present field replaces the stored one
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub engine: Option<Engine>,
    pub tables: Option<Vec<TableData>>,
    pub relations: Option<Vec<Relation>>,
    pub groups: Option<Vec<GroupData>>,
    pub notes: Option<Vec<NoteData>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.engine.is_none()
            && self.tables.is_none()
            && self.relations.is_none()
            && self.groups.is_none()
            && self.notes.is_none()
    }

    /// Apply to a project in place; name is not checked here
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(engine) = self.engine {
            project.schema.engine = engine;
        }
        if let Some(tables) = self.tables {
            project.schema.tables = tables;
        }
        if let Some(relations) = self.relations {
            project.schema.relations = relations;
        }
        if let Some(groups) = self.groups {
            project.schema.groups = groups;
        }
        if let Some(notes) = self.notes {
            project.schema.notes = notes;
        }
    }
}

/// Current time truncated to what the store keeps
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    parse_timestamp(&format_timestamp(&now)).unwrap_or(now)
}

/// RFC 3339 UTC with microseconds; sorts lexicographically in time order
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
