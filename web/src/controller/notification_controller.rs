use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::notification::MarkReadParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Form, Json};
use domain::notification as NotificationApi;
use serde_json::json;

use log::*;

/// POST the caller's notifications, newest first
#[utoipa::path(
    post,
    path = "/notifications/view",
    responses(
        (status = 200, description = "The caller's notifications, newest first", body = [domain::notifications::Model]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn view(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let notifications = NotificationApi::list_for_user(app_state.db_conn_ref(), user.id).await?;

    debug!("User {} has {} notifications", user.id, notifications.len());

    Ok(Json(ApiResponse::new(notifications)))
}

/// GET the number of unread notifications for the badge
#[utoipa::path(
    get,
    path = "/notifications/unread_count",
    responses(
        (status = 200, description = "Unread notification count", body = u64),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn unread_count(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let unread_count = NotificationApi::unread_count(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(json!({ "unread_count": unread_count }))))
}

/// POST mark one of the caller's notifications as read
#[utoipa::path(
    post,
    path = "/notifications/mark_read",
    request_body(content = MarkReadParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Notification marked as read"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found"),
        (status = 422, description = "Missing notification ID"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn mark_read(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<MarkReadParams>,
) -> Result<impl IntoResponse, Error> {
    let notification_id = params.notification_id()?;

    NotificationApi::mark_read(app_state.db_conn_ref(), user.id, notification_id).await?;

    Ok(Json(ApiResponse::message("Notification marked as read")))
}

/// POST mark all of the caller's notifications as read
#[utoipa::path(
    post,
    path = "/notifications/mark_all_read",
    responses(
        (status = 200, description = "Number of notifications that were unread"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn mark_all_read(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let marked = NotificationApi::mark_all_read(app_state.db_conn_ref(), user.id).await?;

    info!("User {} marked {marked} notifications as read", user.id);

    Ok(Json(ApiResponse::with_message(
        "All notifications marked as read",
        json!({ "marked": marked }),
    )))
}
