use crate::controller::ApiResponse;
use crate::{CSRF_HEADER, CSRF_TOKEN_KEY};
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use log::*;
use subtle::ConstantTimeEq;
use tower_sessions::Session;
use url::form_urlencoded;

const MAX_FORM_BYTES: usize = 64 * 1024;

/// Rejects a state-changing request unless it carries the token stored in the session at
/// login, either in the `x-csrf-token` header or as the `csrf_token` form field. Runs
/// before any handler, so a rejected request never reaches the database.
pub async fn require_csrf_token(session: Session, request: Request, next: Next) -> Response {
    let expected = match session.get::<String>(CSRF_TOKEN_KEY).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            warn!("No CSRF token in session for {}", request.uri());
            return rejected();
        }
        Err(e) => {
            error!("Could not read CSRF token from session: {e:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal server error")),
            )
                .into_response();
        }
    };

    let (presented, request) = match presented_token(request).await {
        Ok(found) => found,
        Err(response) => return response,
    };

    match presented {
        Some(token) if tokens_match(&token, &expected) => next.run(request).await,
        _ => {
            warn!("Missing or invalid CSRF token");
            rejected()
        }
    }
}

fn rejected() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::error("Invalid CSRF token")),
    )
        .into_response()
}

// The header wins. Otherwise a form body is buffered, searched, and handed on intact.
async fn presented_token(request: Request) -> Result<(Option<String>, Request), Response> {
    if let Some(value) = request.headers().get(CSRF_HEADER) {
        let token = value.to_str().ok().map(str::to_string);
        return Ok((token, request));
    }

    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| {
            content_type.starts_with("application/x-www-form-urlencoded")
        });
    if !is_form {
        return Ok((None, request));
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES).await.map_err(|e| {
        warn!("Could not buffer form body: {e:?}");
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ApiResponse::error("Request body too large")),
        )
            .into_response()
    })?;

    let token = form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_TOKEN_KEY)
        .map(|(_, value)| value.into_owned());

    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}

// Compares in time independent of where the first difference is.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_requires_identical_tokens() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc124", "abc123"));
        assert!(!tokens_match("abc12", "abc123"));
        assert!(!tokens_match("", "abc123"));
    }

    #[cfg(feature = "mock")]
    mod routed {
        use crate::test_support::{app, client, login, mock_db, read_json};
        use axum::{
            body::Body,
            http::{Request, StatusCode},
        };
        use tower::ServiceExt;

        #[tokio::test]
        async fn cancel_without_token_is_rejected_before_any_appointment_query() {
            let user = client(7);
            let db = mock_db(|db| {
                db.append_query_results([[user.clone()]])
                    .append_query_results([[user.clone()]])
            });
            let app = app(&db);
            let session = login(&app, &user.email).await;

            let request = Request::builder()
                .method("POST")
                .uri("/bookings/cancel")
                .header("cookie", &session.cookie)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("appointment_id=42"))
                .unwrap();
            let response = app.oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                read_json(response).await["message"],
                "Invalid CSRF token"
            );

            // Login and the session lookup are the only statements run.
            let log = std::sync::Arc::into_inner(db)
                .expect("router released its handle")
                .into_transaction_log();
            assert_eq!(log.len(), 2);
            assert!(log
                .iter()
                .all(|txn| txn.statements()[0].sql.contains(r#""salon"."users""#)));
        }

        #[tokio::test]
        async fn cancel_with_a_wrong_token_is_rejected() {
            let user = client(7);
            let db = mock_db(|db| {
                db.append_query_results([[user.clone()]])
                    .append_query_results([[user.clone()]])
            });
            let app = app(&db);
            let session = login(&app, &user.email).await;

            let request = Request::builder()
                .method("POST")
                .uri("/bookings/cancel")
                .header("cookie", &session.cookie)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("appointment_id=42&csrf_token=forged"))
                .unwrap();
            let response = app.oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }
}
