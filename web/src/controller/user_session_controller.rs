use crate::controller::ApiResponse;
use crate::error::{Error as WebError, Result as WebResult};
use crate::CSRF_TOKEN_KEY;
use axum::{response::IntoResponse, Form, Json};
use domain::user::{AuthSession, Credentials};
use log::*;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;
use tower_sessions::Session;

const CSRF_TOKEN_LENGTH: usize = 32;

fn new_csrf_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Logs the user in, returns a session cookie and the CSRF token every state-changing
/// request must carry from now on.
///
/// After logging in, pass the session id back with every call and the token either as the
/// `csrf_token` form field or the `x-csrf-token` header, e.g.:
/// curl -v --header "Cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df" \
///   --data "appointment_id=42&csrf_token=..." http://localhost:4000/bookings/cancel
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = domain::user::Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logs in and returns session authentication cookie and CSRF token"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn login(
    mut auth_session: AuthSession,
    session: Session,
    Form(creds): Form<Credentials>,
) -> WebResult<impl IntoResponse> {
    let user = match auth_session.authenticate(creds.clone()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Authentication failed, inactive user: {:?}", creds.email);
            return Err(WebError::unauthenticated());
        }
        Err(auth_error) => {
            warn!("Authentication failed with error: {auth_error:?}");
            return Err(WebError::unauthenticated());
        }
    };

    if let Err(login_error) = auth_session.login(&user).await {
        warn!("Session login failed: {login_error:?}");
        return Err(WebError::internal("Session login failed", login_error));
    }

    // Issued after login so the token belongs to the new session id.
    let csrf_token = new_csrf_token();
    session
        .insert(CSRF_TOKEN_KEY, &csrf_token)
        .await
        .map_err(|e| WebError::internal("Could not store CSRF token", e))?;

    info!("{} {} logged in", user.role, user.id);

    Ok(Json(ApiResponse::new(json!({
        "id": user.id,
        "full_name": user.full_name,
        "email": user.email,
        "role": user.role,
        "locale": user.locale,
        "csrf_token": csrf_token,
    }))))
}

/// Logs the user out by ending their session.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Successfully logged out"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid CSRF token"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn logout(
    mut auth_session: AuthSession,
    session: Session,
) -> WebResult<impl IntoResponse> {
    trace!("UserSessionController::logout()");

    auth_session
        .logout()
        .await
        .map_err(|e| WebError::internal("Session logout failed", e))?;
    session
        .flush()
        .await
        .map_err(|e| WebError::internal("Session flush failed", e))?;

    Ok(Json(ApiResponse::message("Logged out")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csrf_tokens_are_long_and_fresh() {
        let first = new_csrf_token();
        let second = new_csrf_token();

        assert_eq!(first.len(), CSRF_TOKEN_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }

    #[cfg(feature = "mock")]
    mod routed {
        use crate::test_support::{app, client, login, mock_db, post_form, read_json};
        use axum::{
            body::Body,
            http::{Request, StatusCode},
        };
        use tower::ServiceExt;

        #[tokio::test]
        async fn login_with_wrong_password_is_unauthorized() {
            let user = client(7);
            let db = mock_db(|db| db.append_query_results([[user.clone()]]));
            let app = app(&db);

            let request = Request::builder()
                .uri("/login")
                .method("POST")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(format!("email={}&password=wrong", user.email)))
                .unwrap();
            let response = app.oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(read_json(response).await["status"], "error");
        }

        #[tokio::test]
        async fn logout_ends_the_session_that_login_issued_the_token_for() {
            let user = client(7);
            let db = mock_db(|db| {
                db.append_query_results([[user.clone()]]) // find_by_email during login
                    .append_query_results([[user.clone()]]) // session user for /logout
            });
            let app = app(&db);

            let session = login(&app, &user.email).await;
            assert!(!session.csrf_token.is_empty());

            let response = app
                .clone()
                .oneshot(post_form("/logout", &session, ""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(read_json(response).await["message"], "Logged out");

            // The flushed session no longer carries a user
            let response = app
                .oneshot(post_form("/logout", &session, ""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
