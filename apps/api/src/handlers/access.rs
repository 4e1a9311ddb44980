use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use timekeep_application::require_authenticated;
use timekeep_domain::{DepartmentId, Permission, evaluate_resource_access};

use crate::dto::{AccessCheckRequest, AccessCheckResponse, AccessScopeResponse};
use crate::error::ApiResult;
use crate::middleware::RequestAuth;

/// Resource described by an access request body.
struct RequestedResource {
    owner_id: String,
    department_id: Option<DepartmentId>,
}

impl RequestedResource {
    fn from_request(payload: AccessCheckRequest) -> ApiResult<(Permission, Self)> {
        let permission = Permission::from_transport(payload.permission.as_str())?;
        let department_id = payload
            .resource_department_id
            .filter(|value| !value.trim().is_empty())
            .map(DepartmentId::new)
            .transpose()?;

        Ok((
            permission,
            Self {
                owner_id: payload.resource_owner_id,
                department_id,
            },
        ))
    }
}

/// Reports the decision for a resource without rejecting the request.
pub async fn check_access_handler(
    Extension(auth): Extension<RequestAuth>,
    Json(payload): Json<AccessCheckRequest>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let context = require_authenticated(auth.context())?;
    let (permission, resource) = RequestedResource::from_request(payload)?;

    let result = evaluate_resource_access(
        context.permissions(),
        context.subject(),
        resource.owner_id.as_str(),
        permission,
        resource.department_id.as_ref(),
        context.department_id(),
    );

    Ok(Json(AccessCheckResponse::from(result)))
}

/// Applies the resource gate: 204 when allowed, `RESOURCE_ACCESS_DENIED` otherwise.
pub async fn enforce_access_handler(
    Extension(auth): Extension<RequestAuth>,
    Json(payload): Json<AccessCheckRequest>,
) -> ApiResult<StatusCode> {
    require_authenticated(auth.context())?;
    let (permission, resource) = RequestedResource::from_request(payload)?;

    auth.require_resource(
        permission,
        &resource,
        |resource| resource.owner_id.clone(),
        |resource| resource.department_id.clone(),
    )?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the scoping ids the effective context is bound to.
pub async fn access_scope_handler(
    Extension(auth): Extension<RequestAuth>,
) -> ApiResult<Json<AccessScopeResponse>> {
    let context = require_authenticated(auth.context())?;
    Ok(Json(AccessScopeResponse::from(context)))
}
