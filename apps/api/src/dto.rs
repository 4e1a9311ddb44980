use serde::{Deserialize, Serialize};
use timekeep_domain::{AuthContext, AuthorizationResult, Role};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the resolved authorization context.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-context-response.ts"
)]
pub struct AuthContextResponse {
    pub subject: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub department_id: Option<String>,
    pub organization_id: Option<String>,
    pub impersonated_role: Option<String>,
}

impl AuthContextResponse {
    pub fn from_context(context: &AuthContext, impersonated_role: Option<Role>) -> Self {
        let mut permissions = context
            .permissions()
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .collect::<Vec<_>>();
        permissions.sort();

        Self {
            subject: context.subject().to_owned(),
            role: context.role().as_str().to_owned(),
            permissions,
            department_id: context.department_id().map(ToString::to_string),
            organization_id: context.organization_id().map(ToString::to_string),
            impersonated_role: impersonated_role.map(|role| role.as_str().to_owned()),
        }
    }
}

/// API representation of one role table row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role: String,
    pub permissions: Vec<String>,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role: value.as_str().to_owned(),
            permissions: value
                .permissions()
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

/// Incoming payload for switching the testing role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/testing-role-request.ts"
)]
pub struct TestingRoleRequest {
    pub role: String,
}

/// Incoming payload for a resource access decision.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-check-request.ts"
)]
pub struct AccessCheckRequest {
    pub permission: String,
    pub resource_owner_id: String,
    #[serde(default)]
    pub resource_department_id: Option<String>,
}

/// API representation of an access decision.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-check-response.ts"
)]
pub struct AccessCheckResponse {
    pub authorized: bool,
    pub reason: Option<String>,
    pub missing_permissions: Vec<String>,
}

impl From<AuthorizationResult> for AccessCheckResponse {
    fn from(value: AuthorizationResult) -> Self {
        Self {
            authorized: value.authorized,
            reason: value.reason,
            missing_permissions: value
                .missing_permissions
                .unwrap_or_default()
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

/// Scoping identifiers the current context is bound to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-scope-response.ts"
)]
pub struct AccessScopeResponse {
    pub subject: String,
    pub role: String,
    pub department_id: Option<String>,
    pub organization_id: Option<String>,
}

impl From<&AuthContext> for AccessScopeResponse {
    fn from(value: &AuthContext) -> Self {
        Self {
            subject: value.subject().to_owned(),
            role: value.role().as_str().to_owned(),
            department_id: value.department_id().map(ToString::to_string),
            organization_id: value.organization_id().map(ToString::to_string),
        }
    }
}
