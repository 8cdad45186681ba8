use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::booking::{
    AssignStaffParams, CancelParams, CreateParams, EditParams, IndexParams, StatusParams,
};
use crate::{AppState, Error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Form, Json};
use domain::booking as BookingApi;

use log::*;

/// GET appointments between two dates, as the caller may see them
#[utoipa::path(
    get,
    path = "/bookings",
    params(IndexParams),
    responses(
        (status = 200, description = "Appointments ordered by date and time", body = [domain::AppointmentDetails]),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Missing or invalid date range"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    let actor = authenticated_user.actor();
    debug!("GET bookings for {} {}: {params:?}", actor.role, actor.id);

    let appointments = BookingApi::list(
        app_state.db_conn_ref(),
        &actor,
        params.into_list_params()?,
    )
    .await?;

    debug!("Found {} appointments", appointments.len());

    Ok(Json(ApiResponse::new(appointments)))
}

/// POST book a new appointment
#[utoipa::path(
    post,
    path = "/bookings",
    request_body(content = CreateParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Appointment booked and pending confirmation", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only clients book appointments"),
        (status = 404, description = "Service not found"),
        (status = 422, description = "Missing field or invalid date or time"),
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
    let (slot, notes) = params.into_slot()?;

    let appointment = BookingApi::create(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        slot,
        notes,
        app_state.config().salon_now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Appointment booked successfully!",
            appointment,
        )),
    ))
}

/// POST cancel one of the caller's own appointments
#[utoipa::path(
    post,
    path = "/bookings/cancel",
    request_body(content = CancelParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Appointment cancelled successfully!", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only clients cancel their appointments"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Cannot cancel past appointments, cannot cancel this appointment, or appointment not found or already completed"),
        (status = 422, description = "Missing appointment ID"),
        (status = 500, description = "Deleting record error"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn cancel(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<CancelParams>,
) -> Result<impl IntoResponse, Error> {
    let appointment_id = params.appointment_id()?;

    let appointment = BookingApi::cancel(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        appointment_id,
        app_state.config().salon_now(),
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Appointment cancelled successfully!",
        appointment,
    )))
}

/// POST move one of the caller's own appointments to another slot
#[utoipa::path(
    post,
    path = "/bookings/edit",
    request_body(content = EditParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Appointment moved and pending confirmation again", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only clients edit their appointments"),
        (status = 404, description = "Appointment or service not found"),
        (status = 409, description = "Cannot edit past or finalized appointments"),
        (status = 422, description = "Missing field or invalid date or time"),
        (status = 500, description = "Updating record error"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn edit(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<EditParams>,
) -> Result<impl IntoResponse, Error> {
    let (appointment_id, slot) = params.into_slot()?;

    let appointment = BookingApi::reschedule(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        appointment_id,
        slot,
        app_state.config().salon_now(),
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Appointment updated successfully!",
        appointment,
    )))
}

/// POST move an open appointment to another status
#[utoipa::path(
    post,
    path = "/bookings/status",
    request_body(content = StatusParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Status updated", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only staff and admins change statuses"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is finalized or changed concurrently"),
        (status = 422, description = "Missing appointment ID or invalid status"),
        (status = 500, description = "Updating record error"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update_status(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<StatusParams>,
) -> Result<impl IntoResponse, Error> {
    let (appointment_id, status) = params.parse()?;

    let appointment = BookingApi::update_status(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        appointment_id,
        status,
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Appointment status updated successfully!",
        appointment,
    )))
}

/// POST assign a staff member to an open appointment
#[utoipa::path(
    post,
    path = "/bookings/assign_staff",
    request_body(content = AssignStaffParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Staff member assigned", body = domain::appointments::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only staff and admins assign staff"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is finalized or changed concurrently"),
        (status = 422, description = "Missing ID or not an active staff member"),
        (status = 500, description = "Updating record error"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn assign_staff(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<AssignStaffParams>,
) -> Result<impl IntoResponse, Error> {
    let (appointment_id, staff_id) = params.parse()?;

    let appointment = BookingApi::assign_staff(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        appointment_id,
        staff_id,
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Staff assigned successfully!",
        appointment,
    )))
}
