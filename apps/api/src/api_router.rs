use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use timekeep_core::AppError;
use timekeep_domain::{Permission, Role};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

const MANAGE_ROLES: &[Permission] = &[Permission::ManageRoles];
const VIEW_REPORTS: &[Permission] = &[Permission::ViewReports];
const MANAGEMENT_ROLES: &[Role] = &[Role::Admin, Role::Manager];

pub fn build_router<Store>(
    app_state: AppState,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let cors_layer = build_cors_layer(&app_state.frontend_url)?;

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/auth/testing-role",
            put(auth::set_testing_role_handler).delete(auth::clear_testing_role_handler),
        )
        .route(
            "/api/security/roles",
            get(handlers::security::list_roles_handler).route_layer(from_fn_with_state(
                MANAGE_ROLES,
                middleware::require_permissions,
            )),
        )
        .route(
            "/api/access/check",
            post(handlers::access::check_access_handler),
        )
        .route(
            "/api/access/enforce",
            post(handlers::access::enforce_access_handler),
        )
        .route(
            "/api/reports/access",
            get(handlers::access::access_scope_handler)
                .route_layer(from_fn(middleware::require_department))
                .route_layer(from_fn_with_state(
                    VIEW_REPORTS,
                    middleware::require_permissions,
                )),
        )
        .route(
            "/api/organization/access",
            get(handlers::access::access_scope_handler)
                .route_layer(from_fn(middleware::require_organization)),
        )
        .route(
            "/api/management/access",
            get(handlers::access::access_scope_handler).route_layer(from_fn_with_state(
                MANAGEMENT_ROLES,
                middleware::require_role,
            )),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_auth_context,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}

fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]))
}

#[cfg(test)]
mod tests;
