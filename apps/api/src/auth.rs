mod bootstrap;
mod session;
mod testing_role;

pub use bootstrap::bootstrap_handler;
pub use session::{logout_handler, me_handler};
pub use testing_role::{clear_testing_role_handler, set_testing_role_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
/// Absolute session creation timestamp.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
/// Role an admin is currently evaluating requests as.
pub const SESSION_TESTING_ROLE_KEY: &str = "testing_role";
