/// Identity and ownership resolution
///
/// Authentication happens in front of this service. The fronting proxy
/// forwards the authenticated user id in `x-user-id`; in guest mode every
/// request is served as the configured synthetic user instead.
///
/// The owner context of a request is the caller's personal scope unless
/// `x-workspace-id` names a workspace the caller is a member of.

use crate::api::{error::ApiError, AppState};
use crate::project::Owner;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use serde::Serialize;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const WORKSPACE_ID_HEADER: &str = "x-workspace-id";

/// The user a request acts as
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    /// True when resolved through guest mode
    pub guest: bool,
}

/// Identity plus the scope projects are read from and written to
#[derive(Debug, Clone)]
pub struct OwnerContext {
    pub identity: Identity,
    pub owner: Owner,
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Resolve the caller from configuration and headers
pub fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
    let auth = &state.config.auth;
    if auth.guest_mode {
        return Ok(Identity {
            user_id: auth.guest_user_id.clone(),
            guest: true,
        });
    }

    match header_value(headers, USER_ID_HEADER) {
        Some(user_id) => Ok(Identity {
            user_id: user_id.to_string(),
            guest: false,
        }),
        None => Err(ApiError::Unauthorized(format!(
            "Missing {USER_ID_HEADER} header"
        ))),
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_identity(state, &parts.headers)
    }
}

impl FromRequestParts<AppState> for OwnerContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = resolve_identity(state, &parts.headers)?;

        let Some(workspace_id) = header_value(&parts.headers, WORKSPACE_ID_HEADER) else {
            let owner = Owner::User(identity.user_id.clone());
            return Ok(OwnerContext {
                identity,
                owner,
            });
        };

        let role = state
            .workspaces
            .require_member(workspace_id, &identity.user_id)
            .await?;
        tracing::debug!("🔐 {} acting in workspace {} as {}", identity.user_id, workspace_id, role.as_str());

        Ok(OwnerContext {
            identity,
            owner: Owner::Workspace(workspace_id.to_string()),
        })
    }
}
