use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use timekeep_application::AdminAllowList;
use timekeep_core::AppError;
use tracing_subscriber::EnvFilter;

/// Source of employee and department records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub directory_backend: DirectoryBackend,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub admin_subjects: AdminAllowList,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok(), env::args().nth(1).as_deref())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        command: Option<&str>,
    ) -> Result<Self, AppError> {
        let migrate_only = command == Some("migrate");

        let directory_backend = match lookup("DIRECTORY_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => DirectoryBackend::Postgres {
                database_url: required(&lookup, "DATABASE_URL")?,
            },
            "memory" => DirectoryBackend::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "DIRECTORY_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && directory_backend == DirectoryBackend::Memory {
            return Err(AppError::Validation(
                "migrate requires DIRECTORY_BACKEND=postgres".to_owned(),
            ));
        }

        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty(&lookup, "AUTH_BOOTSTRAP_TOKEN")?;
        let session_secret = required(&lookup, "SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match lookup("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let admin_subjects = lookup("ADMIN_SUBJECTS")
            .map(|value| AdminAllowList::from_csv(value.as_str()))
            .unwrap_or_default();

        Ok(Self {
            migrate_only,
            directory_backend,
            frontend_url,
            bootstrap_token,
            api_host,
            api_port,
            cookie_secure,
            admin_subjects,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = required(lookup, name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
