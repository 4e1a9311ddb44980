use timekeep_application::AuthContextService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_context_service: AuthContextService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
