use std::collections::BTreeSet;

use async_trait::async_trait;
use timekeep_core::AppResult;
use timekeep_domain::{Department, DepartmentId, Employee};

/// Directory port for employee and department lookups.
///
/// Implementations own retries and timeouts. Any error is treated by callers
/// as "no authenticated context".
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Finds the employee record bound to an identity-provider subject.
    async fn find_employee_by_subject(&self, subject: &str) -> AppResult<Option<Employee>>;

    /// Finds a department by identifier.
    async fn find_department(&self, department_id: &DepartmentId)
    -> AppResult<Option<Department>>;
}

/// Configured subjects that always resolve to the admin role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    subjects: BTreeSet<String>,
}

impl AdminAllowList {
    /// Creates an allow-list from subject identifiers. Blank entries are skipped.
    #[must_use]
    pub fn new<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            subjects: subjects
                .into_iter()
                .map(|subject| subject.as_ref().trim().to_owned())
                .filter(|subject| !subject.is_empty())
                .collect(),
        }
    }

    /// Parses a comma-separated list of subjects.
    #[must_use]
    pub fn from_csv(value: &str) -> Self {
        Self::new(value.split(','))
    }

    /// Returns whether the subject is allow-listed.
    #[must_use]
    pub fn contains(&self, subject: &str) -> bool {
        self.subjects.contains(subject)
    }

    /// Returns the number of allow-listed subjects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Returns whether no subject is allow-listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
