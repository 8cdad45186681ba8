use crate::actor::Actor;
use crate::error::{Error, InvalidStateKind, Resource, ValidationErrorKind};
use crate::events::{DomainEvent, EventPublisher};
use crate::Id;
use entity::{appointment_status::AppointmentStatus, roles::Role};
use entity_api::appointment;
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use entity_api::feedback::{self, NewFeedback};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::feedback::Model;

/// A client rates one of their own completed appointments, once.
pub async fn submit(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor: &Actor,
    appointment_id: Id,
    rating: i16,
    comment: Option<String>,
) -> Result<Model, Error> {
    debug!("Client {} rating appointment {appointment_id}", actor.id);
    actor.require(Role::Client)?;

    if !(1..=5).contains(&rating) {
        return Err(Error::validation(ValidationErrorKind::InvalidRating));
    }

    let appointment = appointment::find_by_client_and_id(db, actor.id, appointment_id)
        .await
        .map_err(Error::lookup(Resource::Appointment))?;

    if appointment.status != AppointmentStatus::Completed {
        return Err(Error::invalid_state(InvalidStateKind::NotCompleted));
    }
    if feedback::find_by_appointment_id(db, appointment_id)
        .await?
        .is_some()
    {
        return Err(Error::invalid_state(InvalidStateKind::FeedbackExists));
    }

    let comment = comment
        .map(|comment| comment.trim().to_string())
        .filter(|comment| !comment.is_empty());

    let new_feedback = NewFeedback {
        appointment_id,
        client_id: actor.id,
        rating,
        comment: comment.clone(),
    };
    let feedback = match feedback::create(db, new_feedback).await {
        Ok(feedback) => feedback,
        Err(err) => return Err(insert_failure(db, appointment_id, err).await),
    };

    info!(
        "Feedback {} ({rating}/5) stored for appointment {appointment_id}",
        feedback.id
    );

    event_publisher
        .publish(DomainEvent::FeedbackReceived {
            appointment_id,
            client_id: actor.id,
            rating,
            comment,
        })
        .await;

    Ok(feedback)
}

// A concurrent submission can land between the existence check and the insert; the
// unique index on `appointment_id` then rejects ours.
async fn insert_failure(db: &DatabaseConnection, appointment_id: Id, err: EntityApiError) -> Error {
    let already_rated = err.error_kind == EntityApiErrorKind::RecordExists
        || matches!(
            feedback::find_by_appointment_id(db, appointment_id).await,
            Ok(Some(_))
        );

    if already_rated {
        warn!("Feedback for appointment {appointment_id} was stored by a concurrent request");
        Error::invalid_state(InvalidStateKind::FeedbackExists)
    } else {
        err.into()
    }
}
