use std::borrow::Cow;
use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use domain::error::{
    BookingAction, BookingErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError,
    InternalErrorKind, InvalidStateKind, Resource, ValidationErrorKind,
};

use crate::controller::ApiResponse;

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    /// A failure outside the domain, such as the session store refusing a write.
    pub(crate) fn internal(message: &str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self(DomainError {
            source: Some(Box::new(source)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(message.to_string())),
        })
    }

    pub(crate) fn unauthenticated() -> Self {
        Self(DomainError {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Unauthenticated,
            )),
        })
    }
}

fn missing_field_message(field: &str) -> Cow<'static, str> {
    match field {
        "appointment_id" => "Missing appointment ID".into(),
        "notification_id" => "Missing notification ID".into(),
        "announcement_id" => "Missing announcement ID".into(),
        "staff_id" => "Missing staff ID".into(),
        "service_id" => "Missing service ID".into(),
        "date" | "time" => "Missing appointment date or time".into(),
        "status" => "Missing appointment status".into(),
        other => format!("Missing field: {other}").into(),
    }
}

fn validation_message(kind: &ValidationErrorKind) -> Cow<'static, str> {
    match kind {
        ValidationErrorKind::MissingField(field) => missing_field_message(field),
        ValidationErrorKind::InvalidDateTime => "Invalid appointment date or time".into(),
        ValidationErrorKind::InvalidDateRange => "Invalid date range".into(),
        ValidationErrorKind::InvalidStatus => "Invalid appointment status".into(),
        ValidationErrorKind::SlotInPast => "Appointment time must be in the future".into(),
        ValidationErrorKind::InvalidRating => "Rating must be between 1 and 5".into(),
        ValidationErrorKind::EmptyMessage => "Announcement message cannot be empty".into(),
        ValidationErrorKind::InvalidStaff => "Staff member not found".into(),
    }
}

fn invalid_state_message(kind: &InvalidStateKind) -> &'static str {
    match kind {
        InvalidStateKind::PastAppointment(BookingAction::Cancel) => {
            "Cannot cancel past appointments"
        }
        InvalidStateKind::PastAppointment(BookingAction::Edit) => "Cannot edit past appointments",
        InvalidStateKind::PastAppointment(_) => "Cannot update past appointments",
        InvalidStateKind::AlreadyFinalized(BookingAction::Cancel) => {
            "Cannot cancel this appointment"
        }
        InvalidStateKind::AlreadyFinalized(BookingAction::Edit) => "Cannot edit this appointment",
        InvalidStateKind::AlreadyFinalized(BookingAction::ChangeStatus) => {
            "Cannot change the status of this appointment"
        }
        InvalidStateKind::AlreadyFinalized(BookingAction::AssignStaff) => {
            "Cannot assign staff to this appointment"
        }
        InvalidStateKind::NotCompleted => "Feedback is only accepted for completed appointments",
        InvalidStateKind::FeedbackExists => "Feedback was already submitted for this appointment",
    }
}

fn booking_status_and_message(kind: &BookingErrorKind) -> (StatusCode, Cow<'static, str>) {
    match kind {
        BookingErrorKind::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized".into()),
        BookingErrorKind::Validation(kind) => {
            (StatusCode::UNPROCESSABLE_ENTITY, validation_message(kind))
        }
        BookingErrorKind::NotFound(resource) => (
            StatusCode::NOT_FOUND,
            match resource {
                Resource::Appointment => "Appointment not found",
                Resource::Service => "Service not found",
                Resource::Notification => "Notification not found",
                Resource::Announcement => "Announcement not found",
            }
            .into(),
        ),
        BookingErrorKind::InvalidState(kind) => {
            (StatusCode::CONFLICT, invalid_state_message(kind).into())
        }
        BookingErrorKind::ConcurrentModification => (
            StatusCode::CONFLICT,
            "Appointment not found or already completed".into(),
        ),
        BookingErrorKind::UpdateFailed(BookingAction::Cancel) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Deleting record error".into())
        }
        BookingErrorKind::UpdateFailed(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Updating record error".into())
        }
    }
}

fn status_and_message(kind: &DomainErrorKind) -> (StatusCode, Cow<'static, str>) {
    match kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, "Record not found".into()),
                EntityErrorKind::Conflict => (StatusCode::CONFLICT, "Record already exists".into()),
                EntityErrorKind::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized".into())
                }
                EntityErrorKind::DbTransaction => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                ),
            },
            InternalErrorKind::Other(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            ),
        },
        DomainErrorKind::Booking(booking_error_kind) => {
            booking_status_and_message(booking_error_kind)
        }
    }
}

// Every failure leaves as the JSON error envelope; nothing reaches the client unrendered.
// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, message) = status_and_message(&self.0.error_kind);

        if status_code.is_server_error() {
            error!("{status_code}: {:?} (source: {:?})", self.0.error_kind, self.0.source);
        } else {
            debug!("{status_code}: {:?}", self.0.error_kind);
        }

        (status_code, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
