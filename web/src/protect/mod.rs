//! Role gates for groups of routes.
//!
//! These run before a handler and turn away callers whose session user lacks the role
//! the route is for. The domain repeats the role check on every operation.

use crate::controller::ApiResponse;
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    Json,
};
use domain::{roles::Role, users};
use log::*;

/// A single authorization rule: is the authenticated user allowed to proceed?
///
/// ```rust,ignore
/// #[async_trait]
/// impl Check for UserIsAdmin {
///     async fn eval(&self, _app: &AppState, user: &users::Model) -> bool {
///         user.role == Role::Admin
///     }
/// }
/// ```
#[async_trait]
pub trait Check: Send + Sync {
    async fn eval(&self, app: &AppState, user: &users::Model) -> bool;
}

pub(crate) struct Predicate {
    predicate: Box<dyn Check>,
}

impl Predicate {
    pub(crate) fn new<C: Check + 'static>(predicate: C) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }

    pub(crate) async fn check(&self, app_state: &AppState, user: &users::Model) -> bool {
        self.predicate.eval(app_state, user).await
    }
}

/// Evaluates `checks` in order and answers **403 FORBIDDEN** at the first one that fails.
pub(crate) async fn authorize(
    app_state: &AppState,
    authenticated_user: users::Model,
    request: Request,
    next: Next,
    checks: Vec<Predicate>,
) -> impl IntoResponse {
    for check in checks {
        if !check.check(app_state, &authenticated_user).await {
            warn!(
                "{} {} refused at {}",
                authenticated_user.role,
                authenticated_user.id,
                request.uri()
            );
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error("Unauthorized")),
            )
                .into_response();
        }
    }
    next.run(request).await
}

pub struct UserHasRole(pub Role);

#[async_trait]
impl Check for UserHasRole {
    async fn eval(&self, _app_state: &AppState, authenticated_user: &users::Model) -> bool {
        authenticated_user.role == self.0
    }
}

pub struct UserIsStaffOrAdmin;

#[async_trait]
impl Check for UserIsStaffOrAdmin {
    async fn eval(&self, _app_state: &AppState, authenticated_user: &users::Model) -> bool {
        authenticated_user.role.is_staff_or_admin()
    }
}

/// Booking, editing, cancelling and rating appointments
pub(crate) async fn clients(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserHasRole(Role::Client))];
    authorize(&app_state, user, request, next, checks).await
}

/// Check-in and check-out
pub(crate) async fn staff(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserHasRole(Role::Staff))];
    authorize(&app_state, user, request, next, checks).await
}

/// Announcements
pub(crate) async fn admins(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserHasRole(Role::Admin))];
    authorize(&app_state, user, request, next, checks).await
}

/// Status changes and staff assignment
pub(crate) async fn staff_or_admins(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsStaffOrAdmin)];
    authorize(&app_state, user, request, next, checks).await
}
