//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_employee_directory;
mod postgres_employee_directory;

pub use in_memory_employee_directory::InMemoryEmployeeDirectory;
pub use postgres_employee_directory::PostgresEmployeeDirectory;
