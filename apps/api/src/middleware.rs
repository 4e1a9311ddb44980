use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use timekeep_application::{self as application, GuardResult};
use timekeep_core::{AppError, UserIdentity};
use timekeep_domain::{AuthContext, DepartmentId, ImpersonationContext, Permission, Role};
use tower_sessions::Session;
use tracing::warn;

use crate::auth::{SESSION_TESTING_ROLE_KEY, SESSION_USER_KEY};
use crate::error::ApiResult;
use crate::state::AppState;

/// Authorization state resolved once per request.
///
/// While an impersonation is active the real context lives inside it.
#[derive(Debug, Clone, Default)]
pub struct RequestAuth {
    real: Option<AuthContext>,
    impersonation: Option<ImpersonationContext>,
}

impl RequestAuth {
    /// Combines the freshly built context with the session's testing role.
    ///
    /// The testing role only applies while the real context is admin.
    pub fn new(real: Option<AuthContext>, testing_role: Option<Role>) -> Self {
        let Some(real) = real else {
            return Self::default();
        };

        match testing_role.filter(|_| real.is_admin()) {
            Some(role) => match ImpersonationContext::begin(real.clone(), role) {
                Ok(impersonation) => Self {
                    real: None,
                    impersonation: Some(impersonation),
                },
                Err(_) => Self::authenticated(real),
            },
            None => Self::authenticated(real),
        }
    }

    fn authenticated(real: AuthContext) -> Self {
        Self {
            real: Some(real),
            impersonation: None,
        }
    }

    /// Context every guard evaluates.
    pub fn context(&self) -> Option<&AuthContext> {
        match &self.impersonation {
            Some(impersonation) => Some(impersonation.effective()),
            None => self.real.as_ref(),
        }
    }

    /// Context resolved from the directory, ignoring any impersonation.
    pub fn real_context(&self) -> Option<&AuthContext> {
        match &self.impersonation {
            Some(impersonation) => Some(impersonation.original()),
            None => self.real.as_ref(),
        }
    }

    pub fn impersonated_role(&self) -> Option<Role> {
        self.impersonation
            .as_ref()
            .map(ImpersonationContext::impersonated_role)
    }

    /// Resource gate over the effective context.
    pub fn require_resource<R>(
        &self,
        required: Permission,
        resource: &R,
        owner_id: impl Fn(&R) -> String,
        department_id: impl Fn(&R) -> Option<DepartmentId>,
    ) -> GuardResult {
        application::require_resource(self.context(), required, resource, owner_id, department_id)
    }
}

/// Resolves the [`RequestAuth`] extension for every protected route.
///
/// Never rejects by itself. A missing identity or a failed directory lookup
/// leaves the context empty and the guards answer `AUTH_REQUIRED`.
pub async fn resolve_auth_context(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .unwrap_or_else(|error| {
            warn!(%error, "failed to read session identity");
            None
        });
    let testing_role = session
        .get::<Role>(SESSION_TESTING_ROLE_KEY)
        .await
        .unwrap_or_else(|error| {
            warn!(%error, "failed to read session testing role");
            None
        });

    let real = state.auth_context_service.build(identity.as_ref()).await;
    request
        .extensions_mut()
        .insert(RequestAuth::new(real, testing_role));

    next.run(request).await
}

fn request_context(request: &Request) -> Option<&AuthContext> {
    request
        .extensions()
        .get::<RequestAuth>()
        .and_then(RequestAuth::context)
}

pub async fn require_permissions(
    State(required): State<&'static [Permission]>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    application::require_permissions(request_context(&request), required)?;
    Ok(next.run(request).await)
}

pub async fn require_role(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    application::require_role(request_context(&request), allowed)?;
    Ok(next.run(request).await)
}

pub async fn require_department(request: Request, next: Next) -> ApiResult<Response> {
    application::require_department(request_context(&request))?;
    Ok(next.run(request).await)
}

pub async fn require_organization(request: Request, next: Next) -> ApiResult<Response> {
    application::require_organization(request_context(&request))?;
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use timekeep_domain::{AuthContext, DepartmentId, Role};

    use super::RequestAuth;

    fn context(role: Role) -> AuthContext {
        let department_id = DepartmentId::new("dept-1").ok();
        AuthContext::new("subject-1", role, department_id, None)
    }

    #[test]
    fn testing_role_applies_to_admins() {
        let auth = RequestAuth::new(Some(context(Role::Admin)), Some(Role::Viewer));

        assert_eq!(auth.context().map(AuthContext::role), Some(Role::Viewer));
        assert_eq!(auth.real_context().map(AuthContext::role), Some(Role::Admin));
        assert_eq!(auth.impersonated_role(), Some(Role::Viewer));
    }

    #[test]
    fn testing_role_is_ignored_once_admin_is_lost() {
        let auth = RequestAuth::new(Some(context(Role::Manager)), Some(Role::Viewer));

        assert_eq!(auth.context().map(AuthContext::role), Some(Role::Manager));
        assert_eq!(auth.impersonated_role(), None);
    }

    #[test]
    fn missing_context_stays_missing() {
        let auth = RequestAuth::new(None, Some(Role::Admin));

        assert!(auth.context().is_none());
        assert!(auth.real_context().is_none());
    }
}
