use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::feedback::CreateParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Form, Json};
use domain::feedback as FeedbackApi;

/// POST rate a completed appointment
#[utoipa::path(
    post,
    path = "/feedback",
    request_body(content = CreateParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Feedback stored and admins notified", body = domain::feedback::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only clients leave feedback"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment not completed, or already rated"),
        (status = 422, description = "Missing appointment ID or rating outside 1 to 5"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    let (appointment_id, rating, comment) = params.parse()?;

    let feedback = FeedbackApi::submit(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        appointment_id,
        rating,
        comment,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Thank you for your feedback!",
            feedback,
        )),
    ))
}
