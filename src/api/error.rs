/// API error type and its JSON response shape
///
/// Body: { "error": "<code>", "message": "<text>", "issues": [...] }
/// `issues` is only present for schema validation failures.

use crate::project::ProjectError;
use crate::schema::{ValidationIssue, ValidationReport};
use crate::workspace::WorkspaceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Schema validation failed")]
    Validation(ValidationReport),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<ValidationIssue>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "invalid_schema",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, issues) = match self {
            ApiError::Internal(e) => {
                tracing::error!("❌ Internal error: {:#}", e);
                ("Internal server error".to_string(), None)
            }
            ApiError::Validation(report) => {
                let message = format!("Schema validation failed with {} issue(s)", report.issues.len());
                (message, Some(report.issues))
            }
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            error: code,
            message,
            issues,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(id) => ApiError::NotFound(format!("Project not found: {id}")),
            ProjectError::InvalidName(reason) => {
                ApiError::BadRequest(format!("Invalid project name: {reason}"))
            }
            ProjectError::Invalid(report) => ApiError::Validation(report),
            err @ ProjectError::UnknownNodes(_) => ApiError::BadRequest(err.to_string()),
            ProjectError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl From<WorkspaceError> for ApiError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            WorkspaceError::InvalidName(_) | WorkspaceError::InvalidMember(_) => {
                ApiError::BadRequest(err.to_string())
            }
            WorkspaceError::NotMember { .. } | WorkspaceError::OwnerRequired(_) => {
                ApiError::Forbidden(err.to_string())
            }
            WorkspaceError::LastOwner(_) => ApiError::Conflict(err.to_string()),
            WorkspaceError::Storage(e) => ApiError::Internal(e),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
