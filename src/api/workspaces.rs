/// Workspace REST API endpoints
///
/// Workspaces group users who share projects. Membership changes and
/// deletion are restricted to workspace owners.

use crate::access::Identity;
use crate::api::{
    error::{ApiError, ApiResult},
    AppState,
};
use crate::workspace::{WorkspaceDetails, WorkspaceMember, WorkspaceMembership, WorkspaceRole};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub identity: Identity,
    pub workspaces: Vec<WorkspaceMembership>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
    #[serde(default = "default_member_role")]
    pub role: WorkspaceRole,
}

fn default_member_role() -> WorkspaceRole {
    WorkspaceRole::Member
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub members: Vec<WorkspaceMember>,
}

pub fn create_workspace_routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(whoami))
        .route("/api/workspaces", get(list_workspaces).post(create_workspace))
        .route(
            "/api/workspaces/{id}",
            get(get_workspace).delete(delete_workspace),
        )
        .route("/api/workspaces/{id}/members", post(add_member))
        .route("/api/workspaces/{id}/members/{user_id}", delete(remove_member))
}

/// The resolved caller and their workspaces
///
/// GET /api/me
async fn whoami(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<MeResponse>> {
    let workspaces = state.workspaces.list_for_user(&identity.user_id).await?;
    Ok(Json(MeResponse {
        identity,
        workspaces,
    }))
}

/// GET /api/workspaces
async fn list_workspaces(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Value>> {
    let workspaces = state.workspaces.list_for_user(&identity.user_id).await?;
    Ok(Json(json!({ "workspaces": workspaces })))
}

/// POST /api/workspaces
/// Body: { "name": "..." }
async fn create_workspace(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<WorkspaceMembership>)> {
    let workspace = state
        .workspaces
        .create(&identity.user_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

/// GET /api/workspaces/{id}
async fn get_workspace(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkspaceDetails>> {
    Ok(Json(state.workspaces.details(&id, &identity.user_id).await?))
}

/// DELETE /api/workspaces/{id}
async fn delete_workspace(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.workspaces.delete(&id, &identity.user_id).await?;
    Ok(Json(json!({ "message": "Workspace deleted successfully" })))
}

/// POST /api/workspaces/{id}/members
/// Body: { "userId": "...", "role"?: "member" | "owner" }
async fn add_member(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<Json<MembersResponse>> {
    let members = state
        .workspaces
        .add_member(&id, &identity.user_id, payload.user_id.trim(), payload.role)
        .await?;
    Ok(Json(MembersResponse { members }))
}

/// DELETE /api/workspaces/{id}/members/{user_id}
async fn remove_member(
    State(state): State<AppState>,
    identity: Identity,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    if state
        .workspaces
        .remove_member(&id, &identity.user_id, &user_id)
        .await?
    {
        Ok(Json(json!({ "message": "Member removed successfully" })))
    } else {
        Err(ApiError::NotFound(format!(
            "User {user_id} is not a member of workspace {id}"
        )))
    }
}
