//! Timekeep API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use timekeep_application::{AuthContextService, EmployeeDirectory};
use timekeep_core::AppError;
use timekeep_infrastructure::{InMemoryEmployeeDirectory, PostgresEmployeeDirectory};
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, DirectoryBackend, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let app = match &config.directory_backend {
        DirectoryBackend::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            let session_store = PostgresStore::new(pool.clone())
                .with_table_name("tower_sessions")
                .map_err(|error| {
                    AppError::Validation(format!(
                        "invalid session table name configuration: {error}"
                    ))
                })?;
            session_store.migrate().await.map_err(|error| {
                AppError::Internal(format!("failed to initialize session store: {error}"))
            })?;

            build_app(
                &config,
                Arc::new(PostgresEmployeeDirectory::new(pool)),
                session_store,
            )?
        }
        DirectoryBackend::Memory => {
            warn!("using the in-memory employee directory");
            build_app(
                &config,
                Arc::new(InMemoryEmployeeDirectory::new()),
                MemoryStore::default(),
            )?
        }
    };

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, admin_subjects = config.admin_subjects.len(), "timekeep-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

fn build_app<Store>(
    config: &ApiConfig,
    directory: Arc<dyn EmployeeDirectory>,
    session_store: Store,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let app_state = AppState {
        auth_context_service: AuthContextService::new(directory, config.admin_subjects.clone()),
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    };

    api_router::build_router(app_state, session_layer)
}
