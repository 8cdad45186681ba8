//! Router-level test helpers: a mock database, the real routes behind an in-memory
//! session store, and a logged in session to drive them with.

use crate::{router, AppState, CSRF_HEADER};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use axum_login::{
    tower_sessions::{Expiry, MemoryStore, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use chrono::Utc;
use clap::Parser;
use domain::events::EventPublisher;
use domain::user::Backend;
use domain::{locale::Locale, roles::Role, users, Id};
use password_auth::generate_hash;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use service::config::Config;
use std::sync::Arc;
use time::Duration;
use tower::ServiceExt;

pub(crate) const PASSWORD: &str = "password";

pub(crate) fn user(id: Id, role: Role) -> users::Model {
    let now = Utc::now();
    users::Model {
        id,
        full_name: format!("User {id}"),
        email: format!("user{id}@salon.test"),
        password: generate_hash(PASSWORD),
        role,
        locale: Locale::Ar,
        is_active: true,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

pub(crate) fn client(id: Id) -> users::Model {
    user(id, Role::Client)
}

pub(crate) fn mock_db(
    setup: impl FnOnce(MockDatabase) -> MockDatabase,
) -> Arc<DatabaseConnection> {
    Arc::new(setup(MockDatabase::new(DatabaseBackend::Postgres)).into_connection())
}

/// The full router with no event handlers, so a request runs only the statements its
/// handler issues.
pub(crate) fn app(db: &Arc<DatabaseConnection>) -> Router {
    let app_state = AppState::new(
        // Parsed from a fixed argv so the test harness's own flags never reach clap
        service::AppState::new(Config::parse_from(["salon_booking"]), db),
        EventPublisher::default(),
    );

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));
    let auth_layer = AuthManagerLayerBuilder::new(Backend::new(db), session_layer).build();

    router::define_routes(app_state).layer(auth_layer)
}

pub(crate) struct TestSession {
    pub(crate) cookie: String,
    pub(crate) csrf_token: String,
}

/// Logs `email` in. Consumes the one `find_by_email` result the mock must supply.
pub(crate) async fn login(app: &Router, email: &str) -> TestSession {
    let request = Request::builder()
        .uri("/login")
        .method("POST")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!("email={email}&password={PASSWORD}")))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|c| c.to_str().ok())
        .expect("Login should return session cookie")
        .to_string();
    let body = read_json(response).await;
    let csrf_token = body["data"]["csrf_token"]
        .as_str()
        .expect("Login should return a CSRF token")
        .to_string();

    TestSession { cookie, csrf_token }
}

pub(crate) fn post_form(uri: &str, session: &TestSession, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("cookie", &session.cookie)
        .header(CSRF_HEADER, &session.csrf_token)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A read with the session cookie only; reads carry no CSRF token.
pub(crate) fn get(uri: &str, session: &TestSession) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("cookie", &session.cookie)
        .body(Body::empty())
        .unwrap()
}

pub(crate) async fn read_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
