//! In-app notifications: storing them, fanning them out, and reading them back.
//!
//! Delivery is best effort. A failed insert for one recipient is logged and recorded in the
//! returned [`FanOut`], and the remaining recipients are still served.

use crate::error::{Error, Resource};
use crate::{notifications, users, Id};
use chrono::{NaiveDate, NaiveTime};
use entity::{appointment_status::AppointmentStatus, roles::Role};
use entity_api::appointment::AppointmentDetails;
use entity_api::notification::{self, NewNotification};
use entity_api::user;
use log::*;
use sea_orm::DatabaseConnection;

pub mod dispatcher;
pub mod template;

pub use dispatcher::NotificationDispatcher;
pub use template::{Rendered, Template};

/// Which recipients got their notification.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: Vec<Id>,
    pub failed: Vec<Id>,
}

impl FanOut {
    fn record(&mut self, user_id: Id, result: Result<notifications::Model, Error>) {
        match result {
            Ok(_) => self.delivered.push(user_id),
            Err(err) => {
                warn!("Notification to user {user_id} failed: {err}");
                self.failed.push(user_id);
            }
        }
    }

    pub fn merge(&mut self, other: FanOut) {
        self.delivered.extend(other.delivered);
        self.failed.extend(other.failed);
    }
}

/// What happened to a booking, as far as its client is told.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingEvent {
    Status(AppointmentStatus),
    Updated {
        old_date: NaiveDate,
        old_time: NaiveTime,
    },
}

/// Stores one notification for `user_id` and trims that user's history to
/// `retention_limit` entries.
pub async fn notify(
    db: &DatabaseConnection,
    retention_limit: u64,
    user_id: Id,
    title: &str,
    message: &str,
) -> Result<notifications::Model, Error> {
    Ok(notification::create_with_retention(
        db,
        NewNotification {
            user_id,
            title: title.to_string(),
            message: message.to_string(),
        },
        retention_limit,
    )
    .await?)
}

pub(crate) async fn notify_rendered(
    db: &DatabaseConnection,
    retention_limit: u64,
    user_id: Id,
    rendered: &Rendered,
) -> Result<notifications::Model, Error> {
    notify(db, retention_limit, user_id, &rendered.title, &rendered.message).await
}

/// Tells the booking's client what happened, in the client's language.
pub async fn notify_for_booking_event(
    db: &DatabaseConnection,
    retention_limit: u64,
    booking: &AppointmentDetails,
    event: BookingEvent,
) -> Result<notifications::Model, Error> {
    let template = match event {
        BookingEvent::Status(status) => Template::Booking {
            status,
            service: &booking.service_name,
            date: booking.date,
            time: booking.time,
        },
        BookingEvent::Updated { old_date, old_time } => Template::BookingUpdated {
            service: &booking.service_name,
            old_date,
            old_time,
            new_date: booking.date,
            new_time: booking.time,
        },
    };

    notify_rendered(
        db,
        retention_limit,
        booking.client_id,
        &template.render(booking.client_locale),
    )
    .await
}

/// Sends the same title and message to every active admin, whatever their locale.
pub async fn notify_admins(
    db: &DatabaseConnection,
    retention_limit: u64,
    title: &str,
    message: &str,
) -> Result<FanOut, Error> {
    let admins = user::find_active_by_role(db, Role::Admin).await?;
    let rendered = Rendered {
        title: title.to_string(),
        message: message.to_string(),
    };
    Ok(fan_out(db, retention_limit, &admins, |_| rendered.clone()).await)
}

/// Renders `template` in each recipient's locale for every active user holding `role` and
/// stores one notification each. Fails only if the recipients cannot be listed.
pub async fn broadcast(
    db: &DatabaseConnection,
    retention_limit: u64,
    role: Role,
    template: &Template<'_>,
) -> Result<FanOut, Error> {
    let recipients = user::find_active_by_role(db, role).await?;
    debug!(
        "Broadcasting to {} active {role} user(s)",
        recipients.len()
    );

    Ok(fan_out(db, retention_limit, &recipients, |recipient| {
        template.render(recipient.locale)
    })
    .await)
}

async fn fan_out(
    db: &DatabaseConnection,
    retention_limit: u64,
    recipients: &[users::Model],
    render: impl Fn(&users::Model) -> Rendered,
) -> FanOut {
    let mut report = FanOut::default();
    for recipient in recipients {
        let result = notify_rendered(db, retention_limit, recipient.id, &render(recipient)).await;
        report.record(recipient.id, result);
    }
    report
}

/// A user's notifications, newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Id,
) -> Result<Vec<notifications::Model>, Error> {
    Ok(notification::find_by_user(db, user_id, None).await?)
}

/// Unread notifications for the badge, without loading them.
pub async fn unread_count(db: &DatabaseConnection, user_id: Id) -> Result<u64, Error> {
    Ok(notification::count_unread(db, user_id).await?)
}

/// Marks a notification read. Marking an already read notification again succeeds; a
/// notification that belongs to someone else reads as missing.
pub async fn mark_read(db: &DatabaseConnection, user_id: Id, notification_id: Id) -> Result<(), Error> {
    let rows_affected = notification::mark_read(db, notification_id, user_id).await?;
    if rows_affected == 0 {
        warn!("User {user_id} tried to mark notification {notification_id} they do not own");
        return Err(Error::not_found(Resource::Notification));
    }
    Ok(())
}

/// Returns how many notifications changed from unread to read.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: Id) -> Result<u64, Error> {
    Ok(notification::mark_all_read(db, user_id).await?)
}
