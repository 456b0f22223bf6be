/// Project management REST API endpoints
///
/// CRUD for schema design projects. Every handler works inside the caller's
/// owner context: personal by default, a workspace when `x-workspace-id`
/// is sent.

use crate::access::OwnerContext;
use crate::api::{error::ApiResult, AppState};
use crate::project::{NewProject, Project, ProjectPatch, ProjectSummary};
use crate::schema::canvas::{Bounds, Canvas, NodeMove};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectSummary>,
}

/// Derived canvas plus its bounding box
#[derive(Debug, Serialize)]
pub struct CanvasResponse {
    #[serde(flatten)]
    pub canvas: Canvas,
    pub bounds: Option<Bounds>,
}

impl From<Canvas> for CanvasResponse {
    fn from(canvas: Canvas) -> Self {
        let bounds = canvas.bounds();
        Self { canvas, bounds }
    }
}

/// Request body for position updates
#[derive(Debug, Deserialize)]
pub struct MoveNodesRequest {
    pub moves: Vec<NodeMove>,
}

/// Create project management routes
pub fn create_project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/{id}/duplicate", post(duplicate_project))
        .route("/api/projects/{id}/canvas", get(get_project_canvas))
        .route("/api/projects/{id}/positions", put(move_project_nodes))
}

/// List projects in the current owner context
///
/// GET /api/projects
/// Returns: { "projects": [{ "id", "name", "engine", "tableCount", "createdAt", "updatedAt" }] }
async fn list_projects(
    State(state): State<AppState>,
    ctx: OwnerContext,
) -> ApiResult<Json<ProjectListResponse>> {
    let projects = state.projects.list(&ctx.owner).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// Create a new project
///
/// POST /api/projects
/// Body: { "name": "...", "engine": "postgresql", "tables"?: [...], "relations"?: [...], ... }
async fn create_project(
    State(state): State<AppState>,
    ctx: OwnerContext,
    Json(payload): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.projects.create(&ctx.owner, payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/{id}
async fn get_project(
    State(state): State<AppState>,
    ctx: OwnerContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.projects.get(&ctx.owner, &id).await?))
}

/// Partially update a project
///
/// PUT /api/projects/{id}
/// Body: any subset of { "name", "engine", "tables", "relations", "groups", "notes" }
async fn update_project(
    State(state): State<AppState>,
    ctx: OwnerContext,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.projects.update(&ctx.owner, &id, patch).await?))
}

/// DELETE /api/projects/{id}
async fn delete_project(
    State(state): State<AppState>,
    ctx: OwnerContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.projects.delete(&ctx.owner, &id).await?;
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

/// POST /api/projects/{id}/duplicate
async fn duplicate_project(
    State(state): State<AppState>,
    ctx: OwnerContext,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let copy = state.projects.duplicate(&ctx.owner, &id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// GET /api/projects/{id}/canvas
async fn get_project_canvas(
    State(state): State<AppState>,
    ctx: OwnerContext,
    Path(id): Path<String>,
) -> ApiResult<Json<CanvasResponse>> {
    let project = state.projects.get(&ctx.owner, &id).await?;
    Ok(Json(Canvas::from_schema(&project.schema).into()))
}

/// Apply canvas drags
///
/// PUT /api/projects/{id}/positions
/// Body: { "moves": [{ "id": "...", "kind": "table", "position": { "x": 0, "y": 0 } }] }
async fn move_project_nodes(
    State(state): State<AppState>,
    ctx: OwnerContext,
    Path(id): Path<String>,
    Json(payload): Json<MoveNodesRequest>,
) -> ApiResult<Json<Project>> {
    Ok(Json(
        state.projects.move_nodes(&ctx.owner, &id, &payload.moves).await?,
    ))
}
