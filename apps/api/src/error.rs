use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use timekeep_application::{DenialCode, GuardDenial};
use timekeep_core::AppError;
use tracing::info;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_permissions: Vec<String>,
}

/// HTTP API error wrapper around application errors and guard denials.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Denied(GuardDenial),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<GuardDenial> for ApiError {
    fn from(value: GuardDenial) -> Self {
        Self::Denied(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::App(error) => app_error_response(error),
            Self::Denied(denial) => denial_response(denial),
        }
    }
}

fn app_error_response(error: AppError) -> Response {
    let status = match error {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = Json(ErrorResponse {
        message: error.to_string(),
        code: None,
        missing_permissions: Vec::new(),
    });

    (status, payload).into_response()
}

fn denial_response(denial: GuardDenial) -> Response {
    let status = match denial.code() {
        DenialCode::AuthRequired => StatusCode::UNAUTHORIZED,
        _ => StatusCode::FORBIDDEN,
    };
    info!(code = %denial.code(), reason = denial.reason(), "request denied");

    let payload = Json(ErrorResponse {
        message: denial.reason().to_owned(),
        code: Some(denial.code().as_str().to_owned()),
        missing_permissions: denial
            .missing_permissions()
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .collect(),
    });

    (status, payload).into_response()
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
