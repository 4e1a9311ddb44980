//! Request-pipeline authorization guards.
//!
//! Each guard is a pure decision over the request's [`AuthContext`]. A missing
//! context always yields [`DenialCode::AuthRequired`].

use serde::Serialize;
use thiserror::Error;
use timekeep_core::AppError;
use timekeep_domain::{
    AuthContext, DepartmentId, Permission, Role, evaluate_resource_access,
};

/// Machine-readable reason a guard rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialCode {
    /// No authenticated context is available.
    AuthRequired,
    /// Required permissions are not granted.
    InsufficientPermissions,
    /// Ownership or department scope rejects the resource.
    ResourceAccessDenied,
    /// The resolved role is outside the allowed roles.
    RoleNotAuthorized,
    /// The context carries no department.
    NoDepartmentAccess,
    /// The context carries no organization.
    NoOrganizationAccess,
}

impl DenialCode {
    /// Returns the stable transport code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::ResourceAccessDenied => "RESOURCE_ACCESS_DENIED",
            Self::RoleNotAuthorized => "ROLE_NOT_AUTHORIZED",
            Self::NoDepartmentAccess => "NO_DEPARTMENT_ACCESS",
            Self::NoOrganizationAccess => "NO_ORGANIZATION_ACCESS",
        }
    }
}

impl std::fmt::Display for DenialCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Terminal deny decision produced by a guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {reason}")]
pub struct GuardDenial {
    code: DenialCode,
    reason: String,
    missing_permissions: Vec<Permission>,
}

impl GuardDenial {
    fn new(code: DenialCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            missing_permissions: Vec::new(),
        }
    }

    fn auth_required() -> Self {
        Self::new(DenialCode::AuthRequired, "authentication required")
    }

    /// Returns the denial code.
    #[must_use]
    pub fn code(&self) -> DenialCode {
        self.code
    }

    /// Returns the diagnostic reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    /// Returns the permissions that were required but missing.
    #[must_use]
    pub fn missing_permissions(&self) -> &[Permission] {
        &self.missing_permissions
    }
}

impl From<GuardDenial> for AppError {
    fn from(value: GuardDenial) -> Self {
        match value.code {
            DenialCode::AuthRequired => Self::Unauthorized(value.reason),
            _ => Self::Forbidden(value.to_string()),
        }
    }
}

/// Outcome of a guard: `Ok(())` continues the pipeline.
pub type GuardResult = Result<(), GuardDenial>;

/// Authentication gate: unwraps the context or denies with `AUTH_REQUIRED`.
pub fn require_authenticated(context: Option<&AuthContext>) -> Result<&AuthContext, GuardDenial> {
    context.ok_or_else(GuardDenial::auth_required)
}

/// Permission gate: every permission in `required` must be granted.
pub fn require_permissions(context: Option<&AuthContext>, required: &[Permission]) -> GuardResult {
    let context = require_authenticated(context)?;
    let result = context.authorize_all(required);
    if result.authorized {
        return Ok(());
    }

    Err(GuardDenial {
        code: DenialCode::InsufficientPermissions,
        reason: result
            .reason
            .unwrap_or_else(|| "insufficient permissions".to_owned()),
        missing_permissions: result.missing_permissions.unwrap_or_default(),
    })
}

/// Resource gate: decides `required` against one resource.
///
/// The getters extract the owner subject and department from the caller's
/// resource type so the guard stays independent of resource shapes.
pub fn require_resource<R, O, D>(
    context: Option<&AuthContext>,
    required: Permission,
    resource: &R,
    owner_id: O,
    department_id: D,
) -> GuardResult
where
    O: Fn(&R) -> String,
    D: Fn(&R) -> Option<DepartmentId>,
{
    let context = require_authenticated(context)?;
    let resource_owner_id = owner_id(resource);
    let resource_department_id = department_id(resource);

    let result = evaluate_resource_access(
        context.permissions(),
        context.subject(),
        resource_owner_id.as_str(),
        required,
        resource_department_id.as_ref(),
        context.department_id(),
    );
    if result.authorized {
        return Ok(());
    }

    Err(GuardDenial {
        code: DenialCode::ResourceAccessDenied,
        reason: result
            .reason
            .unwrap_or_else(|| "resource access denied".to_owned()),
        missing_permissions: result.missing_permissions.unwrap_or_default(),
    })
}

/// Role gate: the resolved role must be one of `allowed`.
pub fn require_role(context: Option<&AuthContext>, allowed: &[Role]) -> GuardResult {
    let context = require_authenticated(context)?;
    if allowed.contains(&context.role()) {
        return Ok(());
    }

    let allowed = allowed
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Err(GuardDenial::new(
        DenialCode::RoleNotAuthorized,
        format!("role '{}' is not one of [{allowed}]", context.role()),
    ))
}

/// Department gate: admins pass, everyone else needs a department.
pub fn require_department(context: Option<&AuthContext>) -> GuardResult {
    let context = require_authenticated(context)?;
    if context.is_admin() || context.department_id().is_some() {
        return Ok(());
    }

    Err(GuardDenial::new(
        DenialCode::NoDepartmentAccess,
        format!("subject '{}' has no department", context.subject()),
    ))
}

/// Organization gate: admins pass, everyone else needs an organization.
pub fn require_organization(context: Option<&AuthContext>) -> GuardResult {
    let context = require_authenticated(context)?;
    if context.is_admin() || context.organization_id().is_some() {
        return Ok(());
    }

    Err(GuardDenial::new(
        DenialCode::NoOrganizationAccess,
        format!("subject '{}' has no organization", context.subject()),
    ))
}
