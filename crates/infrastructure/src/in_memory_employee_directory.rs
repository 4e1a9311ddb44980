use std::collections::HashMap;

use async_trait::async_trait;
use timekeep_application::EmployeeDirectory;
use timekeep_core::{AppError, AppResult};
use timekeep_domain::{Department, DepartmentId, Employee};
use tokio::sync::RwLock;

/// In-memory employee directory for local development and tests.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<HashMap<String, Employee>>,
    departments: RwLock<HashMap<DepartmentId, Department>>,
}

impl InMemoryEmployeeDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an employee record keyed by its subject.
    pub async fn save_employee(&self, employee: Employee) -> AppResult<()> {
        let mut employees = self.employees.write().await;
        if employees
            .values()
            .any(|existing| existing.id() == employee.id() && existing.subject() != employee.subject())
        {
            return Err(AppError::Conflict(format!(
                "employee '{}' is already bound to another subject",
                employee.id().as_str()
            )));
        }

        employees.insert(employee.subject().to_owned(), employee);
        Ok(())
    }

    /// Stores a department record.
    pub async fn save_department(&self, department: Department) -> AppResult<()> {
        self.departments
            .write()
            .await
            .insert(department.id().clone(), department);
        Ok(())
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn find_employee_by_subject(&self, subject: &str) -> AppResult<Option<Employee>> {
        Ok(self.employees.read().await.get(subject).cloned())
    }

    async fn find_department(
        &self,
        department_id: &DepartmentId,
    ) -> AppResult<Option<Department>> {
        Ok(self.departments.read().await.get(department_id).cloned())
    }
}
