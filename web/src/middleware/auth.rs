use crate::controller::ApiResponse;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_login::AuthSession;

/// Authentication middleware that returns 401 Unauthorized for unauthenticated requests.
///
/// Used instead of axum-login's `login_required!` macro, which redirects to a login URL.
pub async fn require_auth(
    auth_session: AuthSession<domain::user::Backend>,
    request: Request,
    next: Next,
) -> Response {
    match auth_session.user {
        Some(_user) => next.run(request).await,
        // No session, an expired one, or one whose user was deactivated
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Unauthorized")),
        )
            .into_response(),
    }
}
