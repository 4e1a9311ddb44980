use serde::Serialize;
use timekeep_core::{AppError, AppResult};

use crate::{
    DepartmentId, OrganizationId, Permission, PermissionSet, Role, has_all, has_permission,
    missing_permissions,
};

/// Resolved authorization state for one request.
///
/// Built once per request and never mutated. The permission set is always
/// the role table's set for [`AuthContext::role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    subject: String,
    role: Role,
    permissions: PermissionSet,
    department_id: Option<DepartmentId>,
    organization_id: Option<OrganizationId>,
}

impl AuthContext {
    /// Creates a context for a subject, deriving permissions from the role.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        role: Role,
        department_id: Option<DepartmentId>,
        organization_id: Option<OrganizationId>,
    ) -> Self {
        Self {
            subject: subject.into(),
            role,
            permissions: PermissionSet::for_role(role),
            department_id,
            organization_id,
        }
    }

    /// Returns the authenticated subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the resolved role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the permissions granted by the resolved role.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns the subject's department, if resolved.
    #[must_use]
    pub fn department_id(&self) -> Option<&DepartmentId> {
        self.department_id.as_ref()
    }

    /// Returns the subject's organization, if resolved.
    #[must_use]
    pub fn organization_id(&self) -> Option<&OrganizationId> {
        self.organization_id.as_ref()
    }

    /// Returns whether the resolved role is [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns whether the context satisfies `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        has_permission(&self.permissions, permission)
    }

    /// Checks every permission and reports the missing ones.
    #[must_use]
    pub fn authorize_all(&self, required: &[Permission]) -> AuthorizationResult {
        if has_all(&self.permissions, required) {
            return AuthorizationResult::allowed();
        }

        AuthorizationResult::missing(missing_permissions(&self.permissions, required))
    }

    fn with_role(&self, role: Role) -> Self {
        Self::new(
            self.subject.clone(),
            role,
            self.department_id.clone(),
            self.organization_id.clone(),
        )
    }
}

/// Outcome of one authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationResult {
    /// Whether access is granted.
    pub authorized: bool,
    /// Diagnostic explanation for a denial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Permissions that were required but not granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_permissions: Option<Vec<Permission>>,
}

impl AuthorizationResult {
    /// Grants access.
    #[must_use]
    pub fn allowed() -> Self {
        Self {
            authorized: true,
            reason: None,
            missing_permissions: None,
        }
    }

    /// Denies access with a diagnostic reason.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            authorized: false,
            reason: Some(reason.into()),
            missing_permissions: None,
        }
    }

    /// Denies access because base permissions are absent.
    #[must_use]
    pub fn missing(permissions: Vec<Permission>) -> Self {
        let listed = permissions
            .iter()
            .map(Permission::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            authorized: false,
            reason: Some(format!("missing permissions: {listed}")),
            missing_permissions: Some(permissions),
        }
    }
}

/// Request-scoped evaluation of an admin's context under another role.
///
/// The real context is kept untouched and handed back by
/// [`ImpersonationContext::restore`]. Nothing about the subject's stored
/// role changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpersonationContext {
    original: AuthContext,
    effective: AuthContext,
}

impl ImpersonationContext {
    /// Starts evaluating `original` as `role`. Only admins may impersonate.
    pub fn begin(original: AuthContext, role: Role) -> AppResult<Self> {
        if !original.is_admin() {
            return Err(AppError::Forbidden(format!(
                "subject '{}' with role '{}' cannot switch to testing role '{role}'",
                original.subject(),
                original.role()
            )));
        }

        let effective = original.with_role(role);
        Ok(Self {
            original,
            effective,
        })
    }

    /// Returns the context requests are evaluated against.
    #[must_use]
    pub fn effective(&self) -> &AuthContext {
        &self.effective
    }

    /// Returns the real context of the subject.
    #[must_use]
    pub fn original(&self) -> &AuthContext {
        &self.original
    }

    /// Returns the role being impersonated.
    #[must_use]
    pub fn impersonated_role(&self) -> Role {
        self.effective.role()
    }

    /// Ends the impersonation and returns the real context.
    #[must_use]
    pub fn restore(self) -> AuthContext {
        self.original
    }
}
