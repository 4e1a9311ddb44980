use std::str::FromStr;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use timekeep_application::require_authenticated;
use timekeep_core::AppError;
use timekeep_domain::{ImpersonationContext, Role};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{AuthContextResponse, TestingRoleRequest};
use crate::error::ApiResult;
use crate::middleware::RequestAuth;

use super::SESSION_TESTING_ROLE_KEY;

/// Starts evaluating the admin's requests as another role.
///
/// Admin status is checked against the real context, so an admin already
/// testing a lesser role can still switch.
pub async fn set_testing_role_handler(
    Extension(auth): Extension<RequestAuth>,
    session: Session,
    Json(payload): Json<TestingRoleRequest>,
) -> ApiResult<Json<AuthContextResponse>> {
    let real = require_authenticated(auth.real_context())?;
    let role = Role::from_str(payload.role.as_str())?;
    let impersonation = ImpersonationContext::begin(real.clone(), role)?;

    session
        .insert(SESSION_TESTING_ROLE_KEY, role)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist testing role: {error}")))?;

    info!(subject = real.subject(), %role, "testing role enabled");

    Ok(Json(AuthContextResponse::from_context(
        impersonation.effective(),
        Some(impersonation.impersonated_role()),
    )))
}

/// Restores evaluation under the stored role.
pub async fn clear_testing_role_handler(
    Extension(auth): Extension<RequestAuth>,
    session: Session,
) -> ApiResult<StatusCode> {
    let real = require_authenticated(auth.real_context())?;

    session
        .remove_value(SESSION_TESTING_ROLE_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear testing role: {error}")))?;

    info!(subject = real.subject(), "testing role cleared");

    Ok(StatusCode::NO_CONTENT)
}
