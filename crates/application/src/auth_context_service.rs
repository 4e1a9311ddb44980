use std::sync::Arc;

use timekeep_core::{AppResult, UserIdentity};
use timekeep_domain::{AuthContext, Role};
use tracing::{debug, warn};

use crate::{AdminAllowList, EmployeeDirectory};

/// Application service resolving the per-request [`AuthContext`].
///
/// Holds no state besides its collaborators; every call builds a fresh
/// context.
#[derive(Clone)]
pub struct AuthContextService {
    directory: Arc<dyn EmployeeDirectory>,
    admin_subjects: AdminAllowList,
}

impl AuthContextService {
    /// Creates a new service from a directory implementation and the
    /// configured admin allow-list.
    #[must_use]
    pub fn new(directory: Arc<dyn EmployeeDirectory>, admin_subjects: AdminAllowList) -> Self {
        Self {
            directory,
            admin_subjects,
        }
    }

    /// Builds the context for an authenticated identity.
    ///
    /// Returns `None` when there is no usable subject claim or when the
    /// directory lookup fails. Callers must treat `None` as unauthenticated.
    pub async fn build(&self, identity: Option<&UserIdentity>) -> Option<AuthContext> {
        let identity = identity.filter(|identity| identity.has_subject())?;
        let subject = identity.subject();

        match self.resolve(subject).await {
            Ok(context) => {
                debug!(
                    subject,
                    role = context.role().as_str(),
                    department_id = context.department_id().map(|id| id.as_str()),
                    organization_id = context.organization_id().map(|id| id.as_str()),
                    "resolved auth context"
                );
                Some(context)
            }
            Err(error) => {
                warn!(subject, %error, "employee directory lookup failed; treating request as unauthenticated");
                None
            }
        }
    }

    async fn resolve(&self, subject: &str) -> AppResult<AuthContext> {
        let mut role = Role::DEFAULT;
        let mut department_id = None;
        let mut organization_id = None;

        if let Some(employee) = self.directory.find_employee_by_subject(subject).await? {
            if let Some(employee_department_id) = employee.department_id() {
                if let Some(department) = self
                    .directory
                    .find_department(employee_department_id)
                    .await?
                {
                    if department.is_managed_by(employee.id()) {
                        role = Role::Manager;
                    }
                    organization_id = department.organization_id().cloned();
                }
                department_id = Some(employee_department_id.clone());
            }
        }

        if self.admin_subjects.contains(subject) {
            role = Role::Admin;
        }

        Ok(AuthContext::new(
            subject,
            role,
            department_id,
            organization_id,
        ))
    }
}
