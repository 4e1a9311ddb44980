use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use timekeep_application::require_authenticated;
use timekeep_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::AuthContextResponse;
use crate::error::ApiResult;
use crate::middleware::RequestAuth;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let subject = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(subject) = subject {
        info!(%subject, "session closed");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    Extension(auth): Extension<RequestAuth>,
) -> ApiResult<Json<AuthContextResponse>> {
    let context = require_authenticated(auth.context())?;

    Ok(Json(AuthContextResponse::from_context(
        context,
        auth.impersonated_role(),
    )))
}
