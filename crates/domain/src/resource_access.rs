//! Resource-scoped access decisions.
//!
//! Per-resource narrowing happens only through the two lists below. Every
//! other permission is governed by the role table alone.

use crate::{AuthorizationResult, DepartmentId, Permission, PermissionSet, has_permission};

/// Permissions that may only be exercised on resources the subject owns.
pub const OWNERSHIP_RESTRICTED_PERMISSIONS: &[Permission] =
    &[Permission::UpdateTimeEntry, Permission::DeleteTimeEntry];

/// Permissions that may only be exercised inside the subject's department.
pub const DEPARTMENT_RESTRICTED_PERMISSIONS: &[Permission] = &[
    Permission::ViewAllTimeEntries,
    Permission::ManageEmployeeAssignments,
];

/// Returns whether `required` may be exercised against the described resource.
#[must_use]
pub fn can_access_resource(
    granted: &PermissionSet,
    subject_id: &str,
    resource_owner_id: &str,
    required: Permission,
    resource_department_id: Option<&DepartmentId>,
    subject_department_id: Option<&DepartmentId>,
) -> bool {
    evaluate_resource_access(
        granted,
        subject_id,
        resource_owner_id,
        required,
        resource_department_id,
        subject_department_id,
    )
    .authorized
}

/// Evaluates a resource-scoped check and explains a denial.
///
/// Rules apply in order and the first match decides:
/// 1. the system-admin override allows,
/// 2. a missing base permission denies,
/// 3. ownership-restricted permissions require `subject_id == resource_owner_id`,
/// 4. department-restricted permissions require both departments present and equal,
/// 5. anything else is allowed.
#[must_use]
pub fn evaluate_resource_access(
    granted: &PermissionSet,
    subject_id: &str,
    resource_owner_id: &str,
    required: Permission,
    resource_department_id: Option<&DepartmentId>,
    subject_department_id: Option<&DepartmentId>,
) -> AuthorizationResult {
    if granted.is_system_admin() {
        return AuthorizationResult::allowed();
    }

    if !has_permission(granted, required) {
        return AuthorizationResult::missing(vec![required]);
    }

    if OWNERSHIP_RESTRICTED_PERMISSIONS.contains(&required) {
        return if subject_id == resource_owner_id {
            AuthorizationResult::allowed()
        } else {
            AuthorizationResult::denied(format!(
                "subject does not own the resource required by '{required}'"
            ))
        };
    }

    if DEPARTMENT_RESTRICTED_PERMISSIONS.contains(&required) {
        return match (resource_department_id, subject_department_id) {
            (Some(resource), Some(subject)) if resource == subject => {
                AuthorizationResult::allowed()
            }
            (Some(_), Some(_)) => AuthorizationResult::denied(format!(
                "department scope mismatch for '{required}'"
            )),
            _ => AuthorizationResult::denied(format!(
                "department scope unavailable for '{required}'"
            )),
        };
    }

    AuthorizationResult::allowed()
}
