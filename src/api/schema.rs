/// Stateless schema endpoints
///
/// Validation and canvas derivation for documents that are not (yet) stored,
/// plus the engine type catalogs the editor offers.

use crate::api::{error::ApiResult, projects::CanvasResponse, AppState};
use crate::schema::{validate_schema, Canvas, Engine, Schema, ValidationIssue};
use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineInfo {
    pub id: Engine,
    pub label: &'static str,
    pub data_types: &'static [&'static str],
    pub default_id_type: &'static str,
}

pub fn create_schema_routes() -> Router<AppState> {
    Router::new()
        .route("/api/engines", get(list_engines))
        .route("/api/schema/validate", post(validate_document))
        .route("/api/schema/canvas", post(derive_canvas))
}

/// GET /api/engines
async fn list_engines() -> Json<Vec<EngineInfo>> {
    Json(
        Engine::ALL
            .iter()
            .map(|engine| EngineInfo {
                id: *engine,
                label: engine.label(),
                data_types: engine.data_types(),
                default_id_type: engine.default_id_type(),
            })
            .collect(),
    )
}

/// Validate a schema document without storing it
///
/// POST /api/schema/validate
/// Returns 200 with { "valid": bool, "issues": [...] } for any well-formed body
async fn validate_document(Json(schema): Json<Schema>) -> ApiResult<Json<ValidateResponse>> {
    let report = validate_schema(&schema);
    Ok(Json(ValidateResponse {
        valid: report.is_valid(),
        issues: report.issues,
    }))
}

/// POST /api/schema/canvas
async fn derive_canvas(Json(schema): Json<Schema>) -> Json<CanvasResponse> {
    Json(Canvas::from_schema(&schema).into())
}
