use axum::Json;
use timekeep_domain::Role;

use crate::dto::RoleResponse;

/// Lists the static role table. Gated on `manage-roles` by the router.
pub async fn list_roles_handler() -> Json<Vec<RoleResponse>> {
    Json(Role::all().iter().copied().map(RoleResponse::from).collect())
}
