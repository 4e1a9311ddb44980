//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod context;
mod directory;
mod permission_set;
mod resource_access;
mod security;

pub use context::{AuthContext, AuthorizationResult, ImpersonationContext};
pub use directory::{Department, DepartmentId, Employee, EmployeeId, OrganizationId};
pub use permission_set::{
    PermissionSet, has_all, has_any, has_permission, missing_permissions, permissions_for,
};
pub use resource_access::{
    DEPARTMENT_RESTRICTED_PERMISSIONS, OWNERSHIP_RESTRICTED_PERMISSIONS, can_access_resource,
    evaluate_resource_access,
};
pub use security::{Permission, Role};
