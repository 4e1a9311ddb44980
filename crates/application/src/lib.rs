//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_context_service;
mod directory_ports;
mod guards;

pub use auth_context_service::AuthContextService;
pub use directory_ports::{AdminAllowList, EmployeeDirectory};
pub use guards::{
    DenialCode, GuardDenial, GuardResult, require_authenticated, require_department,
    require_organization, require_permissions, require_resource, require_role,
};
