//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree with `domain::error::Error` as the root,
/// holding a tree of `error_kind` enums. The `source` field holds the original error from a
/// lower layer, if any. `web` turns each leaf kind into an HTTP status and a message, and
/// never needs to look at `entity_api` errors directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    Booking(BookingErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Other(String),
}

/// Entity layer errors reduced to what the domain cares about.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    /// A unique constraint rejected the write
    Conflict,
    Unauthenticated,
    DbTransaction,
}

/// Rejections of a booking, feedback, announcement or notification action.
/// None of them leave a row changed.
#[derive(Debug, PartialEq)]
pub enum BookingErrorKind {
    /// Wrong role for the action
    Unauthorized,
    Validation(ValidationErrorKind),
    /// No such row, or a row the caller may not see. The two are never told apart.
    NotFound(Resource),
    InvalidState(InvalidStateKind),
    /// The conditional update matched no row: someone else changed it first.
    ConcurrentModification,
    /// The conditional update itself failed in the database.
    UpdateFailed(BookingAction),
}

#[derive(Debug, PartialEq)]
pub enum ValidationErrorKind {
    MissingField(&'static str),
    /// Date must be `YYYY-MM-DD` and time `HH:MM`
    InvalidDateTime,
    InvalidDateRange,
    /// Not one of `pending`, `confirmed`, `completed`, `cancelled`
    InvalidStatus,
    /// A new or moved booking must start after now
    SlotInPast,
    /// Ratings run from 1 to 5
    InvalidRating,
    EmptyMessage,
    /// Assignee is not an active staff member
    InvalidStaff,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Resource {
    Appointment,
    Service,
    Notification,
    Announcement,
}

/// The booking action a state check was guarding.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BookingAction {
    Cancel,
    Edit,
    ChangeStatus,
    AssignStaff,
}

#[derive(Debug, PartialEq)]
pub enum InvalidStateKind {
    /// The appointment has already started
    PastAppointment(BookingAction),
    /// Status is `completed` or `cancelled`
    AlreadyFinalized(BookingAction),
    /// Feedback is only taken for completed appointments
    NotCompleted,
    FeedbackExists,
}

impl Error {
    pub(crate) fn booking(kind: BookingErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Booking(kind),
        }
    }

    pub(crate) fn unauthorized() -> Self {
        Self::booking(BookingErrorKind::Unauthorized)
    }

    pub fn validation(kind: ValidationErrorKind) -> Self {
        Self::booking(BookingErrorKind::Validation(kind))
    }

    pub(crate) fn invalid_state(kind: InvalidStateKind) -> Self {
        Self::booking(BookingErrorKind::InvalidState(kind))
    }

    pub(crate) fn not_found(resource: Resource) -> Self {
        Self::booking(BookingErrorKind::NotFound(resource))
    }

    /// For `map_err` on lookups: a missing row becomes `NotFound(resource)`, anything else
    /// goes through the usual entity translation.
    pub(crate) fn lookup(resource: Resource) -> impl FnOnce(EntityApiError) -> Error {
        move |err| match err.error_kind {
            EntityApiErrorKind::RecordNotFound => Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Booking(BookingErrorKind::NotFound(resource)),
            },
            _ => err.into(),
        }
    }

    /// For `map_err` on the single conditional update of an action.
    pub(crate) fn update_failed(action: BookingAction) -> impl FnOnce(EntityApiError) -> Error {
        move |err| Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Booking(BookingErrorKind::UpdateFailed(action)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::RecordExists => EntityErrorKind::Conflict,
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}
