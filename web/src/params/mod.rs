//! Typed form and query parameters for the endpoints.
//!
//! Every field arrives as an optional string so that a missing or blank value is answered
//! with the envelope's "Missing ..." message rather than a bare extractor rejection. Fields
//! not listed here, including any posted `user_id` or `role`, are ignored: identity always
//! comes from the session.

pub(crate) mod announcement;
pub(crate) mod booking;
pub(crate) mod feedback;
pub(crate) mod notification;

use domain::error::{Error as DomainError, ValidationErrorKind};
use domain::Id;

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// A required field, trimmed.
pub(crate) fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, DomainError> {
    present(value).ok_or_else(|| DomainError::validation(ValidationErrorKind::MissingField(field)))
}

/// A required id. Anything that is not a positive integer counts as missing.
pub(crate) fn required_id(value: Option<&str>, field: &'static str) -> Result<Id, DomainError> {
    required(value, field)?
        .parse::<Id>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| DomainError::validation(ValidationErrorKind::MissingField(field)))
}

/// An optional id; a blank value is treated as absent.
pub(crate) fn optional_id(value: Option<&str>, field: &'static str) -> Result<Option<Id>, DomainError> {
    match present(value) {
        Some(_) => required_id(value, field).map(Some),
        None => Ok(None),
    }
}

/// Optional free text; blank becomes `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::error::{BookingErrorKind, DomainErrorKind};

    fn missing(field: &'static str) -> DomainErrorKind {
        DomainErrorKind::Booking(BookingErrorKind::Validation(ValidationErrorKind::MissingField(
            field,
        )))
    }

    #[test]
    fn blank_and_absent_ids_are_missing() {
        assert_eq!(
            required_id(None, "appointment_id").unwrap_err().error_kind,
            missing("appointment_id")
        );
        assert_eq!(
            required_id(Some("  "), "appointment_id").unwrap_err().error_kind,
            missing("appointment_id")
        );
        assert_eq!(
            required_id(Some("abc"), "appointment_id").unwrap_err().error_kind,
            missing("appointment_id")
        );
        assert_eq!(required_id(Some(" 42 "), "appointment_id").unwrap(), 42);
    }

    #[test]
    fn optional_id_accepts_blank_but_not_garbage() {
        assert_eq!(optional_id(Some(""), "service_id").unwrap(), None);
        assert_eq!(optional_id(Some("3"), "service_id").unwrap(), Some(3));
        assert!(optional_id(Some("three"), "service_id").is_err());
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(
            optional_text(Some(" window seat ".to_string())),
            Some("window seat".to_string())
        );
    }
}
