use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use timekeep_application::EmployeeDirectory;
use timekeep_core::{AppError, AppResult};
use timekeep_domain::{Department, DepartmentId, Employee, EmployeeId, OrganizationId};
use tracing::debug;

/// PostgreSQL-backed employee and department lookups.
#[derive(Clone)]
pub struct PostgresEmployeeDirectory {
    pool: PgPool,
}

impl PostgresEmployeeDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: String,
    subject: String,
    department_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct DepartmentRow {
    id: String,
    manager_id: Option<String>,
    organization_id: Option<String>,
}

impl EmployeeRow {
    fn into_employee(self) -> AppResult<Employee> {
        let id = EmployeeId::new(self.id).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode employee id for subject '{}': {error}",
                self.subject
            ))
        })?;
        let department_id = self
            .department_id
            .filter(|value| !value.trim().is_empty())
            .map(DepartmentId::new)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode department id for employee '{}': {error}",
                    id.as_str()
                ))
            })?;

        Ok(Employee::new(id, self.subject, department_id))
    }
}

impl DepartmentRow {
    fn into_department(self) -> AppResult<Department> {
        let id = DepartmentId::new(self.id)
            .map_err(|error| AppError::Internal(format!("failed to decode department id: {error}")))?;
        let manager_id = self
            .manager_id
            .filter(|value| !value.trim().is_empty())
            .map(EmployeeId::new)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode manager id for department '{id}': {error}"
                ))
            })?;
        let organization_id = self
            .organization_id
            .filter(|value| !value.trim().is_empty())
            .map(OrganizationId::new)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode organization id for department '{id}': {error}"
                ))
            })?;

        Ok(Department::new(id, manager_id, organization_id))
    }
}

#[async_trait]
impl EmployeeDirectory for PostgresEmployeeDirectory {
    async fn find_employee_by_subject(&self, subject: &str) -> AppResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, subject, department_id
            FROM employees
            WHERE subject = $1
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load employee: {error}")))?;

        if row.is_none() {
            debug!(subject, "no employee record for subject");
        }

        row.map(EmployeeRow::into_employee).transpose()
    }

    async fn find_department(
        &self,
        department_id: &DepartmentId,
    ) -> AppResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            r#"
            SELECT id, manager_id, organization_id
            FROM departments
            WHERE id = $1
            "#,
        )
        .bind(department_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load department '{department_id}': {error}"
            ))
        })?;

        row.map(DepartmentRow::into_department).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::{DepartmentRow, EmployeeRow};

    #[test]
    fn employee_row_treats_blank_department_as_absent() {
        let employee = EmployeeRow {
            id: "emp-1".to_owned(),
            subject: "alice".to_owned(),
            department_id: Some(" ".to_owned()),
        }
        .into_employee();
        assert!(employee.is_ok_and(|employee| employee.department_id().is_none()));
    }

    #[test]
    fn employee_row_rejects_blank_id() {
        let employee = EmployeeRow {
            id: String::new(),
            subject: "alice".to_owned(),
            department_id: None,
        }
        .into_employee();
        assert!(employee.is_err());
    }

    #[test]
    fn department_row_decodes_scoping_ids() {
        let department = DepartmentRow {
            id: "dept-1".to_owned(),
            manager_id: Some("emp-7".to_owned()),
            organization_id: Some("org-1".to_owned()),
        }
        .into_department();
        assert!(department.is_ok());
        let Ok(department) = department else {
            return;
        };
        assert_eq!(department.manager_id().map(|id| id.as_str()), Some("emp-7"));
        assert_eq!(
            department.organization_id().map(|id| id.as_str()),
            Some("org-1")
        );
    }
}
