//! Appointment lifecycle.
//!
//! `pending` and `confirmed` are open; `completed` and `cancelled` are terminal. Staff and
//! admins may move an open appointment to any other status. The only move open to a client
//! is cancelling their own open appointment before it starts.
//!
//! Each operation validates first and then performs exactly one conditional update, so a
//! rejected call leaves nothing changed and can be retried. The event describing the change
//! is published only after that update reports a row.

use crate::actor::Actor;
use crate::error::{
    BookingAction, BookingErrorKind, Error, InvalidStateKind, Resource, ValidationErrorKind,
};
use crate::events::{DomainEvent, EventPublisher};
use crate::{appointments, Id};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use entity::{appointment_status::AppointmentStatus, roles::Role};
use entity_api::appointment::{
    self, AppointmentDetails, ListFilter, NewAppointment, NewSlot, Scope,
};
use entity_api::error::EntityApiErrorKind;
use entity_api::{service, user};
use log::*;
use sea_orm::{ActiveEnum, DatabaseConnection};
use serde::Deserialize;
use utoipa::ToSchema;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses a `YYYY-MM-DD` date and `HH:MM` time as entered by a client.
pub fn parse_slot(date: &str, time: &str) -> Result<(NaiveDate, NaiveTime), Error> {
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| Error::validation(ValidationErrorKind::InvalidDateTime))?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
        .map_err(|_| Error::validation(ValidationErrorKind::InvalidDateTime))?;
    Ok((date, time))
}

/// Parses a status as posted by staff, e.g. `confirmed`.
pub fn parse_status(status: &str) -> Result<AppointmentStatus, Error> {
    AppointmentStatus::try_from_value(&status.trim().to_lowercase())
        .map_err(|_| Error::validation(ValidationErrorKind::InvalidStatus))
}

/// Slot requested for a new booking or a move.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct SlotRequest {
    /// Required when booking; when moving a booking, defaults to its current service
    pub service_id: Option<Id>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

#[derive(Clone, Debug, Default)]
pub struct ListParams {
    /// `YYYY-MM-DD`, inclusive
    pub from: String,
    /// `YYYY-MM-DD`, inclusive
    pub to: String,
    pub status: Option<AppointmentStatus>,
    /// For staff: only appointments assigned to them
    pub mine: bool,
}

fn ensure_future(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> Result<(), Error> {
    if date.and_time(time) <= now {
        warn!("Rejected slot {date} {time}: not after {now}");
        return Err(Error::validation(ValidationErrorKind::SlotInPast));
    }
    Ok(())
}

fn ensure_open(appointment: &appointments::Model, action: BookingAction) -> Result<(), Error> {
    if appointment.status.is_terminal() {
        warn!(
            "Rejected {action:?} on appointment {} in terminal status {}",
            appointment.id, appointment.status
        );
        return Err(Error::invalid_state(InvalidStateKind::AlreadyFinalized(action)));
    }
    Ok(())
}

fn ensure_not_started(
    appointment: &appointments::Model,
    action: BookingAction,
    now: NaiveDateTime,
) -> Result<(), Error> {
    if appointment.starts_at() < now {
        warn!(
            "Rejected {action:?} on appointment {} that started at {}",
            appointment.id,
            appointment.starts_at()
        );
        return Err(Error::invalid_state(InvalidStateKind::PastAppointment(action)));
    }
    Ok(())
}

fn ensure_one_row(rows_affected: u64, appointment_id: Id) -> Result<(), Error> {
    if rows_affected == 0 {
        warn!("Appointment {appointment_id} changed underneath the update");
        return Err(Error::booking(BookingErrorKind::ConcurrentModification));
    }
    Ok(())
}

/// Books `slot` for a client. The price is copied from the service at this moment.
pub async fn create(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor: &Actor,
    slot: SlotRequest,
    notes: Option<String>,
    now: NaiveDateTime,
) -> Result<appointments::Model, Error> {
    debug!("Client {} booking {slot:?}", actor.id);
    actor.require(Role::Client)?;

    let service_id = slot
        .service_id
        .ok_or_else(|| Error::validation(ValidationErrorKind::MissingField("service_id")))?;
    let (date, time) = parse_slot(&slot.date, &slot.time)?;
    ensure_future(date, time, now)?;

    let service = service::find_active_by_id(db, service_id)
        .await
        .map_err(Error::lookup(Resource::Service))?;

    let appointment = appointment::create(
        db,
        NewAppointment {
            client_id: actor.id,
            service_id: service.id,
            date,
            time,
            price: service.price,
            notes: notes.filter(|notes| !notes.trim().is_empty()),
        },
    )
    .await?;

    info!(
        "Appointment {} booked by client {} for {date} {time}",
        appointment.id, actor.id
    );

    event_publisher
        .publish(DomainEvent::BookingCreated {
            appointment_id: appointment.id,
            client_id: appointment.client_id,
        })
        .await;

    Ok(appointment)
}

/// A client cancels one of their own appointments.
///
/// Checks run in this order: role, ownership, terminal status, start time. The cancel
/// itself only succeeds if the status read here is still the current one, so of two
/// concurrent cancels exactly one wins.
pub async fn cancel(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor: &Actor,
    appointment_id: Id,
    now: NaiveDateTime,
) -> Result<appointments::Model, Error> {
    debug!("Client {} cancelling appointment {appointment_id}", actor.id);
    actor.require(Role::Client)?;

    let appointment = appointment::find_by_client_and_id(db, actor.id, appointment_id)
        .await
        .map_err(Error::lookup(Resource::Appointment))?;

    ensure_open(&appointment, BookingAction::Cancel)?;
    ensure_not_started(&appointment, BookingAction::Cancel, now)?;

    let previous = appointment.status;
    let rows_affected = appointment::update_status(
        db,
        appointment_id,
        Scope::Client(actor.id),
        previous,
        AppointmentStatus::Cancelled,
    )
    .await
    .map_err(Error::update_failed(BookingAction::Cancel))?;
    ensure_one_row(rows_affected, appointment_id)?;

    info!("Appointment {appointment_id} cancelled by client {}", actor.id);

    event_publisher
        .publish(DomainEvent::BookingStatusChanged {
            appointment_id,
            client_id: appointment.client_id,
            actor_id: actor.id,
            previous,
            current: AppointmentStatus::Cancelled,
        })
        .await;

    Ok(appointments::Model {
        status: AppointmentStatus::Cancelled,
        ..appointment
    })
}

/// Staff or an admin moves an open appointment to `new_status`. Staff only reach
/// appointments assigned to them. Setting the current status again changes nothing and
/// publishes nothing.
pub async fn update_status(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor: &Actor,
    appointment_id: Id,
    new_status: AppointmentStatus,
) -> Result<appointments::Model, Error> {
    debug!(
        "{} {} setting appointment {appointment_id} to {new_status}",
        actor.role, actor.id
    );
    actor.require_staff_or_admin()?;

    let scope = match actor.role {
        Role::Staff => Scope::Staff(actor.id),
        _ => Scope::Any,
    };

    let appointment = appointment::find_scoped(db, scope, appointment_id)
        .await
        .map_err(Error::lookup(Resource::Appointment))?;

    ensure_open(&appointment, BookingAction::ChangeStatus)?;

    let previous = appointment.status;
    if previous == new_status {
        debug!("Appointment {appointment_id} already {new_status}");
        return Ok(appointment);
    }

    let rows_affected =
        appointment::update_status(db, appointment_id, scope, previous, new_status)
            .await
            .map_err(Error::update_failed(BookingAction::ChangeStatus))?;
    ensure_one_row(rows_affected, appointment_id)?;

    info!(
        "Appointment {appointment_id} moved {previous} -> {new_status} by {} {}",
        actor.role, actor.id
    );

    event_publisher
        .publish(DomainEvent::BookingStatusChanged {
            appointment_id,
            client_id: appointment.client_id,
            actor_id: actor.id,
            previous,
            current: new_status,
        })
        .await;

    Ok(appointments::Model {
        status: new_status,
        ..appointment
    })
}

/// Assigns an active staff member to an open appointment without touching its status.
pub async fn assign_staff(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor: &Actor,
    appointment_id: Id,
    staff_id: Id,
) -> Result<appointments::Model, Error> {
    debug!(
        "{} {} assigning staff {staff_id} to appointment {appointment_id}",
        actor.role, actor.id
    );
    actor.require_staff_or_admin()?;

    let assignee = match user::find_by_id(db, staff_id).await {
        Ok(user) => Some(user),
        Err(err) if err.error_kind == EntityApiErrorKind::RecordNotFound => None,
        Err(err) => return Err(err.into()),
    };
    if !assignee.is_some_and(|user| user.is_active && user.role == Role::Staff) {
        warn!("Rejected assignment of {staff_id}: not an active staff member");
        return Err(Error::validation(ValidationErrorKind::InvalidStaff));
    }

    let appointment = appointment::find_by_id(db, appointment_id)
        .await
        .map_err(Error::lookup(Resource::Appointment))?;

    ensure_open(&appointment, BookingAction::AssignStaff)?;

    let rows_affected = appointment::assign_staff(db, appointment_id, staff_id)
        .await
        .map_err(Error::update_failed(BookingAction::AssignStaff))?;
    ensure_one_row(rows_affected, appointment_id)?;

    info!("Staff {staff_id} assigned to appointment {appointment_id}");

    event_publisher
        .publish(DomainEvent::StaffAssigned {
            appointment_id,
            client_id: appointment.client_id,
            staff_id,
        })
        .await;

    Ok(appointments::Model {
        staff_id: Some(staff_id),
        ..appointment
    })
}

/// A client moves their open, not yet started appointment to another slot and possibly
/// another service. The booking goes back to `pending` and takes the new service's price.
pub async fn reschedule(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor: &Actor,
    appointment_id: Id,
    slot: SlotRequest,
    now: NaiveDateTime,
) -> Result<appointments::Model, Error> {
    debug!(
        "Client {} moving appointment {appointment_id} to {slot:?}",
        actor.id
    );
    actor.require(Role::Client)?;

    let (date, time) = parse_slot(&slot.date, &slot.time)?;

    let appointment = appointment::find_by_client_and_id(db, actor.id, appointment_id)
        .await
        .map_err(Error::lookup(Resource::Appointment))?;

    ensure_open(&appointment, BookingAction::Edit)?;
    ensure_not_started(&appointment, BookingAction::Edit, now)?;
    ensure_future(date, time, now)?;

    let service_id = slot.service_id.unwrap_or(appointment.service_id);
    let service = service::find_active_by_id(db, service_id)
        .await
        .map_err(Error::lookup(Resource::Service))?;

    let rows_affected = appointment::reschedule(
        db,
        appointment_id,
        actor.id,
        appointment.status,
        NewSlot {
            service_id: service.id,
            date,
            time,
            price: service.price,
        },
    )
    .await
    .map_err(Error::update_failed(BookingAction::Edit))?;
    ensure_one_row(rows_affected, appointment_id)?;

    info!(
        "Appointment {appointment_id} moved from {} to {date} {time} by client {}",
        appointment.starts_at(),
        actor.id
    );

    event_publisher
        .publish(DomainEvent::BookingRescheduled {
            appointment_id,
            client_id: appointment.client_id,
            previous_date: appointment.date,
            previous_time: appointment.time,
        })
        .await;

    Ok(appointments::Model {
        service_id: service.id,
        date,
        time,
        price: service.price,
        status: AppointmentStatus::Pending,
        ..appointment
    })
}

/// Appointments between two dates as the actor may see them: clients get their own,
/// staff get everything or only their assignments, admins get everything.
pub async fn list(
    db: &DatabaseConnection,
    actor: &Actor,
    params: ListParams,
) -> Result<Vec<AppointmentDetails>, Error> {
    let from = NaiveDate::parse_from_str(params.from.trim(), DATE_FORMAT)
        .map_err(|_| Error::validation(ValidationErrorKind::InvalidDateTime))?;
    let to = NaiveDate::parse_from_str(params.to.trim(), DATE_FORMAT)
        .map_err(|_| Error::validation(ValidationErrorKind::InvalidDateTime))?;
    if from > to {
        return Err(Error::validation(ValidationErrorKind::InvalidDateRange));
    }

    let scope = match actor.role {
        Role::Client => Some(Scope::Client(actor.id)),
        Role::Staff if params.mine => Some(Scope::Staff(actor.id)),
        Role::Staff | Role::Admin => None,
    };

    Ok(appointment::list_by_date_range(
        db,
        from,
        to,
        ListFilter {
            status: params.status,
            scope,
        },
    )
    .await?)
}
