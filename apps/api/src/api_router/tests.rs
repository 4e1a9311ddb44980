use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use timekeep_application::{AdminAllowList, AuthContextService};
use timekeep_domain::{Department, DepartmentId, Employee, EmployeeId, OrganizationId};
use timekeep_infrastructure::InMemoryEmployeeDirectory;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::state::AppState;

use super::build_router;

const FRONTEND_URL: &str = "http://localhost:3000";
const BOOTSTRAP_TOKEN: &str = "bootstrap-token";

fn department_id(value: &str) -> DepartmentId {
    DepartmentId::new(value).unwrap_or_else(|error| panic!("invalid department id: {error}"))
}

fn employee(id: &str, subject: &str, department: &str) -> Employee {
    let id = EmployeeId::new(id).unwrap_or_else(|error| panic!("invalid employee id: {error}"));
    Employee::new(id, subject, Some(department_id(department)))
}

/// mia manages dept-1 in org-1, eve works in dept-1, vic works in dept-2
/// which belongs to no organization, root is allow-listed as admin.
async fn build_test_app() -> Router {
    let directory = InMemoryEmployeeDirectory::new();
    let manager_id =
        EmployeeId::new("emp-mia").unwrap_or_else(|error| panic!("invalid employee id: {error}"));
    let organization_id =
        OrganizationId::new("org-1").unwrap_or_else(|error| panic!("invalid org id: {error}"));

    let seeded = async {
        directory
            .save_department(Department::new(
                department_id("dept-1"),
                Some(manager_id),
                Some(organization_id),
            ))
            .await?;
        directory
            .save_department(Department::new(department_id("dept-2"), None, None))
            .await?;
        directory
            .save_employee(employee("emp-mia", "mia", "dept-1"))
            .await?;
        directory
            .save_employee(employee("emp-eve", "eve", "dept-1"))
            .await?;
        directory
            .save_employee(employee("emp-vic", "vic", "dept-2"))
            .await
    }
    .await;
    if let Err(error) = seeded {
        panic!("failed to seed directory: {error}");
    }

    let state = AppState {
        auth_context_service: AuthContextService::new(
            Arc::new(directory),
            AdminAllowList::new(["root"]),
        ),
        frontend_url: FRONTEND_URL.to_owned(),
        bootstrap_token: BOOTSTRAP_TOKEN.to_owned(),
    };
    let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

    build_router(state, session_layer).unwrap_or_else(|error| panic!("router: {error}"))
}

struct TestResponse {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, FRONTEND_URL);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|error| panic!("invalid request: {error}"));

    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|error| panic!("request failed: {error}"));

    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(ToOwned::to_owned);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|error| panic!("failed to read body: {error}"));
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        cookie,
        body,
    }
}

async fn login(app: &Router, subject: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/auth/bootstrap",
        None,
        Some(json!({ "subject": subject, "token": BOOTSTRAP_TOKEN })),
    )
    .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    response
        .cookie
        .unwrap_or_else(|| panic!("bootstrap did not set a session cookie"))
}

async fn get(app: &Router, uri: &str, cookie: &str) -> TestResponse {
    send(app, Method::GET, uri, Some(cookie), None).await
}

#[tokio::test]
async fn health_is_public() {
    let app = build_test_app().await;

    let response = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = build_test_app().await;

    for uri in ["/auth/me", "/api/security/roles", "/api/reports/access"] {
        let response = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.body["code"], "AUTH_REQUIRED", "{uri}");
    }
}

#[tokio::test]
async fn bootstrap_rejects_wrong_token() {
    let app = build_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/auth/bootstrap",
        None,
        Some(json!({ "subject": "mia", "token": "guess" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutations_without_matching_origin_are_rejected() {
    let app = build_test_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/bootstrap")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "subject": "mia", "token": BOOTSTRAP_TOKEN }).to_string(),
        ))
        .unwrap_or_else(|error| panic!("invalid request: {error}"));

    let response = app
        .oneshot(request)
        .await
        .unwrap_or_else(|error| panic!("request failed: {error}"));

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_reports_department_manager_promotion() {
    let app = build_test_app().await;
    let cookie = login(&app, "mia").await;

    let response = get(&app, "/auth/me", &cookie).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["subject"], "mia");
    assert_eq!(response.body["role"], "manager");
    assert_eq!(response.body["department_id"], "dept-1");
    assert_eq!(response.body["organization_id"], "org-1");
    assert_eq!(response.body["impersonated_role"], Value::Null);

    let permissions = response.body["permissions"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert!(permissions.contains(&json!("view-reports")));
    let mut sorted = permissions.clone();
    sorted.sort_by(|left, right| left.as_str().cmp(&right.as_str()));
    assert_eq!(permissions, sorted);
}

#[tokio::test]
async fn unknown_subject_resolves_to_unscoped_employee() {
    let app = build_test_app().await;
    let cookie = login(&app, "newcomer").await;

    let response = get(&app, "/auth/me", &cookie).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["role"], "employee");
    assert_eq!(response.body["department_id"], Value::Null);
    assert_eq!(response.body["organization_id"], Value::Null);
}

#[tokio::test]
async fn role_table_requires_manage_roles() {
    let app = build_test_app().await;
    let eve = login(&app, "eve").await;
    let root = login(&app, "root").await;

    let denied = get(&app, "/api/security/roles", &eve).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["code"], "INSUFFICIENT_PERMISSIONS");
    assert_eq!(denied.body["missing_permissions"], json!(["manage-roles"]));

    let allowed = get(&app, "/api/security/roles", &root).await;
    assert_eq!(allowed.status, StatusCode::OK);
    let roles = allowed.body.as_array().cloned().unwrap_or_default();
    assert_eq!(roles.len(), 4);
    assert_eq!(roles[0]["role"], "admin");
}

#[tokio::test]
async fn reports_require_permission_then_department() {
    let app = build_test_app().await;
    let eve = login(&app, "eve").await;
    let mia = login(&app, "mia").await;
    let root = login(&app, "root").await;

    let employee = get(&app, "/api/reports/access", &eve).await;
    assert_eq!(employee.status, StatusCode::FORBIDDEN);
    assert_eq!(employee.body["code"], "INSUFFICIENT_PERMISSIONS");

    let manager = get(&app, "/api/reports/access", &mia).await;
    assert_eq!(manager.status, StatusCode::OK);
    assert_eq!(manager.body["department_id"], "dept-1");

    let admin = get(&app, "/api/reports/access", &root).await;
    assert_eq!(admin.status, StatusCode::OK);
    assert_eq!(admin.body["department_id"], Value::Null);
}

#[tokio::test]
async fn organization_gate_denies_unscoped_departments() {
    let app = build_test_app().await;
    let vic = login(&app, "vic").await;
    let mia = login(&app, "mia").await;

    let denied = get(&app, "/api/organization/access", &vic).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["code"], "NO_ORGANIZATION_ACCESS");

    let allowed = get(&app, "/api/organization/access", &mia).await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body["organization_id"], "org-1");
}

#[tokio::test]
async fn management_routes_require_admin_or_manager() {
    let app = build_test_app().await;
    let eve = login(&app, "eve").await;
    let mia = login(&app, "mia").await;

    let denied = get(&app, "/api/management/access", &eve).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["code"], "ROLE_NOT_AUTHORIZED");

    let allowed = get(&app, "/api/management/access", &mia).await;
    assert_eq!(allowed.status, StatusCode::OK);
}

#[tokio::test]
async fn access_check_reports_ownership_decisions() {
    let app = build_test_app().await;
    let eve = login(&app, "eve").await;

    let foreign = send(
        &app,
        Method::POST,
        "/api/access/check",
        Some(&eve),
        Some(json!({ "permission": "update-time-entry", "resource_owner_id": "mia" })),
    )
    .await;
    assert_eq!(foreign.status, StatusCode::OK);
    assert_eq!(foreign.body["authorized"], false);

    let own = send(
        &app,
        Method::POST,
        "/api/access/check",
        Some(&eve),
        Some(json!({ "permission": "update-time-entry", "resource_owner_id": "eve" })),
    )
    .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["authorized"], true);
}

#[tokio::test]
async fn access_check_rejects_unknown_permission() {
    let app = build_test_app().await;
    let eve = login(&app, "eve").await;

    let response = send(
        &app,
        Method::POST,
        "/api/access/check",
        Some(&eve),
        Some(json!({ "permission": "approve-timesheet", "resource_owner_id": "eve" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn access_enforce_applies_department_scope() {
    let app = build_test_app().await;
    let mia = login(&app, "mia").await;

    let other_department = send(
        &app,
        Method::POST,
        "/api/access/enforce",
        Some(&mia),
        Some(json!({
            "permission": "view-all-time-entries",
            "resource_owner_id": "vic",
            "resource_department_id": "dept-2",
        })),
    )
    .await;
    assert_eq!(other_department.status, StatusCode::FORBIDDEN);
    assert_eq!(other_department.body["code"], "RESOURCE_ACCESS_DENIED");

    let own_department = send(
        &app,
        Method::POST,
        "/api/access/enforce",
        Some(&mia),
        Some(json!({
            "permission": "view-all-time-entries",
            "resource_owner_id": "eve",
            "resource_department_id": "dept-1",
        })),
    )
    .await;
    assert_eq!(own_department.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn testing_role_is_admin_only() {
    let app = build_test_app().await;
    let mia = login(&app, "mia").await;

    let response = send(
        &app,
        Method::PUT,
        "/api/auth/testing-role",
        Some(&mia),
        Some(json!({ "role": "admin" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn testing_role_rejects_unknown_roles() {
    let app = build_test_app().await;
    let root = login(&app, "root").await;

    let response = send(
        &app,
        Method::PUT,
        "/api/auth/testing-role",
        Some(&root),
        Some(json!({ "role": "project_manager" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn testing_role_narrows_admin_until_cleared() {
    let app = build_test_app().await;
    let root = login(&app, "root").await;

    let enabled = send(
        &app,
        Method::PUT,
        "/api/auth/testing-role",
        Some(&root),
        Some(json!({ "role": "viewer" })),
    )
    .await;
    assert_eq!(enabled.status, StatusCode::OK);
    assert_eq!(enabled.body["role"], "viewer");
    assert_eq!(enabled.body["impersonated_role"], "viewer");

    let me = get(&app, "/auth/me", &root).await;
    assert_eq!(me.body["role"], "viewer");
    assert_eq!(me.body["subject"], "root");

    let narrowed = get(&app, "/api/security/roles", &root).await;
    assert_eq!(narrowed.status, StatusCode::FORBIDDEN);
    assert_eq!(narrowed.body["code"], "INSUFFICIENT_PERMISSIONS");

    let cleared = send(&app, Method::DELETE, "/api/auth/testing-role", Some(&root), None).await;
    assert_eq!(cleared.status, StatusCode::NO_CONTENT);

    let restored = get(&app, "/api/security/roles", &root).await;
    assert_eq!(restored.status, StatusCode::OK);
}

#[tokio::test]
async fn impersonated_manager_without_department_loses_department_access() {
    let app = build_test_app().await;
    let root = login(&app, "root").await;

    let enabled = send(
        &app,
        Method::PUT,
        "/api/auth/testing-role",
        Some(&root),
        Some(json!({ "role": "manager" })),
    )
    .await;
    assert_eq!(enabled.status, StatusCode::OK);

    let response = get(&app, "/api/reports/access", &root).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["code"], "NO_DEPARTMENT_ACCESS");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = build_test_app().await;
    let cookie = login(&app, "eve").await;

    let logout = send(&app, Method::POST, "/auth/logout", Some(&cookie), None).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let me = get(&app, "/auth/me", &cookie).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}
