use std::str::FromStr;

use serde::{Deserialize, Serialize};
use timekeep_core::AppError;

/// Permissions enforced by application policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    /// Allows creating projects.
    CreateProject,
    /// Allows updating projects.
    UpdateProject,
    /// Allows deleting projects.
    DeleteProject,
    /// Allows reading projects.
    ViewProject,
    /// Allows assigning employees to projects.
    AssignProject,
    /// Allows recording time entries.
    CreateTimeEntry,
    /// Allows editing owned time entries.
    UpdateTimeEntry,
    /// Allows deleting owned time entries.
    DeleteTimeEntry,
    /// Allows reading time entries.
    ViewTimeEntry,
    /// Allows reading every time entry in the subject's department.
    ViewAllTimeEntries,
    /// Allows creating employee records.
    CreateEmployee,
    /// Allows updating employee records.
    UpdateEmployee,
    /// Allows deleting employee records.
    DeleteEmployee,
    /// Allows reading employee records.
    ViewEmployee,
    /// Allows managing project assignments of department employees.
    ManageEmployeeAssignments,
    /// Allows creating departments.
    CreateDepartment,
    /// Allows updating departments.
    UpdateDepartment,
    /// Allows deleting departments.
    DeleteDepartment,
    /// Allows reading departments.
    ViewDepartment,
    /// Allows managing department membership and settings.
    ManageDepartment,
    /// Allows creating organizations.
    CreateOrganization,
    /// Allows updating organizations.
    UpdateOrganization,
    /// Allows deleting organizations.
    DeleteOrganization,
    /// Allows reading organizations.
    ViewOrganization,
    /// Allows opening the dashboard.
    ViewDashboard,
    /// Allows reading reports.
    ViewReports,
    /// Allows reading analytics.
    ViewAnalytics,
    /// Allows exporting report data.
    ExportData,
    /// Allows managing user accounts.
    ManageUsers,
    /// Allows managing role assignments.
    ManageRoles,
    /// Satisfies every other permission check.
    SystemAdmin,
}

impl Permission {
    /// Returns a stable transport value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProject => "create-project",
            Self::UpdateProject => "update-project",
            Self::DeleteProject => "delete-project",
            Self::ViewProject => "view-project",
            Self::AssignProject => "assign-project",
            Self::CreateTimeEntry => "create-time-entry",
            Self::UpdateTimeEntry => "update-time-entry",
            Self::DeleteTimeEntry => "delete-time-entry",
            Self::ViewTimeEntry => "view-time-entry",
            Self::ViewAllTimeEntries => "view-all-time-entries",
            Self::CreateEmployee => "create-employee",
            Self::UpdateEmployee => "update-employee",
            Self::DeleteEmployee => "delete-employee",
            Self::ViewEmployee => "view-employee",
            Self::ManageEmployeeAssignments => "manage-employee-assignments",
            Self::CreateDepartment => "create-department",
            Self::UpdateDepartment => "update-department",
            Self::DeleteDepartment => "delete-department",
            Self::ViewDepartment => "view-department",
            Self::ManageDepartment => "manage-department",
            Self::CreateOrganization => "create-organization",
            Self::UpdateOrganization => "update-organization",
            Self::DeleteOrganization => "delete-organization",
            Self::ViewOrganization => "view-organization",
            Self::ViewDashboard => "view-dashboard",
            Self::ViewReports => "view-reports",
            Self::ViewAnalytics => "view-analytics",
            Self::ExportData => "export-data",
            Self::ManageUsers => "manage-users",
            Self::ManageRoles => "manage-roles",
            Self::SystemAdmin => "system-admin",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::CreateProject,
            Permission::UpdateProject,
            Permission::DeleteProject,
            Permission::ViewProject,
            Permission::AssignProject,
            Permission::CreateTimeEntry,
            Permission::UpdateTimeEntry,
            Permission::DeleteTimeEntry,
            Permission::ViewTimeEntry,
            Permission::ViewAllTimeEntries,
            Permission::CreateEmployee,
            Permission::UpdateEmployee,
            Permission::DeleteEmployee,
            Permission::ViewEmployee,
            Permission::ManageEmployeeAssignments,
            Permission::CreateDepartment,
            Permission::UpdateDepartment,
            Permission::DeleteDepartment,
            Permission::ViewDepartment,
            Permission::ManageDepartment,
            Permission::CreateOrganization,
            Permission::UpdateOrganization,
            Permission::DeleteOrganization,
            Permission::ViewOrganization,
            Permission::ViewDashboard,
            Permission::ViewReports,
            Permission::ViewAnalytics,
            Permission::ExportData,
            Permission::ManageUsers,
            Permission::ManageRoles,
            Permission::SystemAdmin,
        ];

        ALL
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Closed set of roles a subject can resolve to for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including system administration.
    Admin,
    /// Department-scoped management access.
    Manager,
    /// Default role: own time entries and read access to projects.
    Employee,
    /// Strictly read-only access.
    Viewer,
}

impl Role {
    /// Role assigned when nothing promotes the subject.
    pub const DEFAULT: Self = Self::Employee;

    /// Returns a stable transport value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
            Self::Viewer => "viewer",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Admin, Self::Manager, Self::Employee, Self::Viewer]
    }

    /// Parses a stored role value, falling back to the default role for
    /// values outside the closed set.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::from_str(value).unwrap_or(Self::DEFAULT)
    }

    /// Returns the permissions granted to this role by the role table.
    #[must_use]
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::Admin => Permission::all(),
            Self::Manager => MANAGER_PERMISSIONS,
            Self::Employee => EMPLOYEE_PERMISSIONS,
            Self::Viewer => VIEWER_PERMISSIONS,
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ViewDepartment,
    Permission::ManageDepartment,
    Permission::ViewEmployee,
    Permission::ManageEmployeeAssignments,
    Permission::CreateProject,
    Permission::UpdateProject,
    Permission::ViewProject,
    Permission::AssignProject,
    Permission::CreateTimeEntry,
    Permission::UpdateTimeEntry,
    Permission::DeleteTimeEntry,
    Permission::ViewTimeEntry,
    Permission::ViewAllTimeEntries,
    Permission::ViewDashboard,
    Permission::ViewReports,
    Permission::ViewAnalytics,
    Permission::ExportData,
];

const EMPLOYEE_PERMISSIONS: &[Permission] = &[
    Permission::ViewProject,
    Permission::CreateTimeEntry,
    Permission::UpdateTimeEntry,
    Permission::DeleteTimeEntry,
    Permission::ViewTimeEntry,
    Permission::ViewDashboard,
];

const VIEWER_PERMISSIONS: &[Permission] = &[
    Permission::ViewProject,
    Permission::ViewTimeEntry,
    Permission::ViewDashboard,
];
