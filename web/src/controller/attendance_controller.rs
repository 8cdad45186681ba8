use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::attendance as AttendanceApi;
use domain::booking::{DATE_FORMAT, TIME_FORMAT};
use serde_json::json;

/// POST record that the calling staff member has arrived
#[utoipa::path(
    post,
    path = "/attendance/check_in",
    responses(
        (status = 200, description = "Checked in; admins notified"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only staff check in"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn check_in(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let now = app_state.config().salon_now();

    AttendanceApi::check_in(
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        now,
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Checked in successfully!",
        json!({
            "date": now.format(DATE_FORMAT).to_string(),
            "time": now.format(TIME_FORMAT).to_string(),
        }),
    )))
}

/// POST record that the calling staff member has left
#[utoipa::path(
    post,
    path = "/attendance/check_out",
    responses(
        (status = 200, description = "Checked out; admins notified"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only staff check out"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn check_out(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let now = app_state.config().salon_now();

    AttendanceApi::check_out(
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        now,
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Checked out successfully!",
        json!({
            "date": now.format(DATE_FORMAT).to_string(),
            "time": now.format(TIME_FORMAT).to_string(),
        }),
    )))
}
