//! Employee directory records consulted while resolving a subject's scope.

use serde::{Deserialize, Serialize};
use timekeep_core::{AppResult, NonEmptyString};

/// Unique identifier for an employee record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(NonEmptyString);

impl EmployeeId {
    /// Creates a validated employee identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Unique identifier for a department.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(NonEmptyString);

impl DepartmentId {
    /// Creates a validated department identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unique identifier for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(NonEmptyString);

impl OrganizationId {
    /// Creates a validated organization identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Employee record linked to an authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    id: EmployeeId,
    subject: String,
    department_id: Option<DepartmentId>,
}

impl Employee {
    /// Creates an employee record.
    #[must_use]
    pub fn new(
        id: EmployeeId,
        subject: impl Into<String>,
        department_id: Option<DepartmentId>,
    ) -> Self {
        Self {
            id,
            subject: subject.into(),
            department_id,
        }
    }

    /// Returns the employee identifier.
    #[must_use]
    pub fn id(&self) -> &EmployeeId {
        &self.id
    }

    /// Returns the identity-provider subject bound to this employee.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the department the employee belongs to.
    #[must_use]
    pub fn department_id(&self) -> Option<&DepartmentId> {
        self.department_id.as_ref()
    }
}

/// Department record with its registered manager and organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    id: DepartmentId,
    manager_id: Option<EmployeeId>,
    organization_id: Option<OrganizationId>,
}

impl Department {
    /// Creates a department record.
    #[must_use]
    pub fn new(
        id: DepartmentId,
        manager_id: Option<EmployeeId>,
        organization_id: Option<OrganizationId>,
    ) -> Self {
        Self {
            id,
            manager_id,
            organization_id,
        }
    }

    /// Returns the department identifier.
    #[must_use]
    pub fn id(&self) -> &DepartmentId {
        &self.id
    }

    /// Returns the registered manager, if any.
    #[must_use]
    pub fn manager_id(&self) -> Option<&EmployeeId> {
        self.manager_id.as_ref()
    }

    /// Returns the owning organization, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<&OrganizationId> {
        self.organization_id.as_ref()
    }

    /// Returns whether `employee_id` is the registered manager.
    #[must_use]
    pub fn is_managed_by(&self, employee_id: &EmployeeId) -> bool {
        self.manager_id.as_ref() == Some(employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Department, DepartmentId, EmployeeId};

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(EmployeeId::new("").is_err());
        assert!(DepartmentId::new("  ").is_err());
    }

    #[test]
    fn department_without_manager_is_managed_by_nobody() {
        let Ok(department_id) = DepartmentId::new("dept-1") else {
            panic!("valid department id");
        };
        let Ok(employee_id) = EmployeeId::new("emp-1") else {
            panic!("valid employee id");
        };

        let unmanaged = Department::new(department_id.clone(), None, None);
        assert!(!unmanaged.is_managed_by(&employee_id));

        let managed = Department::new(department_id, Some(employee_id.clone()), None);
        assert!(managed.is_managed_by(&employee_id));
    }
}
