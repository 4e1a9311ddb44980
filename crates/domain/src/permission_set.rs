//! Granted permission sets and the predicates evaluated against them.
//!
//! Every predicate checks [`Permission::SystemAdmin`] before anything else, so
//! a set holding it satisfies every requirement.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// Immutable set of permissions granted to a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Returns the set granted to a role by the role table.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        role.permissions().iter().copied().collect()
    }

    /// Returns whether the permission is literally part of the set.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns whether the set carries the system-admin override.
    #[must_use]
    pub fn is_system_admin(&self) -> bool {
        self.0.contains(&Permission::SystemAdmin)
    }

    /// Iterates the granted permissions in stable order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Returns the number of granted permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Returns the permission set the role table grants to `role`.
#[must_use]
pub fn permissions_for(role: Role) -> PermissionSet {
    PermissionSet::for_role(role)
}

/// Returns whether `granted` satisfies `required`.
#[must_use]
pub fn has_permission(granted: &PermissionSet, required: Permission) -> bool {
    granted.is_system_admin() || granted.contains(required)
}

/// Returns whether at least one of `required` is satisfied.
#[must_use]
pub fn has_any(granted: &PermissionSet, required: &[Permission]) -> bool {
    if granted.is_system_admin() {
        return !required.is_empty();
    }

    required
        .iter()
        .any(|permission| has_permission(granted, *permission))
}

/// Returns whether every entry of `required` is satisfied.
#[must_use]
pub fn has_all(granted: &PermissionSet, required: &[Permission]) -> bool {
    if granted.is_system_admin() {
        return true;
    }

    required
        .iter()
        .all(|permission| has_permission(granted, *permission))
}

/// Returns the entries of `required` that `granted` does not satisfy, in
/// input order and without duplicates.
#[must_use]
pub fn missing_permissions(granted: &PermissionSet, required: &[Permission]) -> Vec<Permission> {
    if granted.is_system_admin() {
        return Vec::new();
    }

    let mut missing = Vec::new();
    for permission in required {
        if !has_permission(granted, *permission) && !missing.contains(permission) {
            missing.push(*permission);
        }
    }

    missing
}
