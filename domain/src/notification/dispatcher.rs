//! Turns domain events into stored notifications.

use super::{
    broadcast, notify_admins, notify_for_booking_event, notify_rendered, BookingEvent, FanOut,
    Template,
};
use crate::error::Error;
use crate::events::{DomainEvent, EventHandler};
use crate::Id;
use async_trait::async_trait;
use entity::{appointment_status::AppointmentStatus, roles::Role};
use entity_api::{appointment, user};
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Event handler that writes the notifications for each domain event.
///
/// | event | recipients |
/// |---|---|
/// | booking created | client, admins |
/// | status changed | client, plus admins when the client cancelled |
/// | booking rescheduled | client, admins |
/// | staff assigned | the staff member |
/// | feedback received | admins |
/// | announcement | active clients |
/// | check-in / check-out | admins |
pub struct NotificationDispatcher {
    db: Arc<DatabaseConnection>,
    retention_limit: u64,
}

impl NotificationDispatcher {
    pub fn new(db: &Arc<DatabaseConnection>, retention_limit: u64) -> Self {
        Self {
            db: Arc::clone(db),
            retention_limit,
        }
    }

    /// Writes every notification `event` calls for and reports who got one. An error means
    /// the event's data could not be read, so nobody was notified.
    pub async fn dispatch(&self, event: &DomainEvent) -> Result<FanOut, Error> {
        let db = self.db.as_ref();
        let limit = self.retention_limit;
        let mut report = FanOut::default();

        match event {
            DomainEvent::BookingCreated { appointment_id, .. } => {
                let booking = appointment::find_details_by_id(db, *appointment_id).await?;
                let result = notify_for_booking_event(
                    db,
                    limit,
                    &booking,
                    BookingEvent::Status(AppointmentStatus::Pending),
                )
                .await;
                report.record(booking.client_id, result);

                let template = Template::NewBooking {
                    client_name: &booking.client_name,
                    service: &booking.service_name,
                    date: booking.date,
                    time: booking.time,
                };
                report.merge(broadcast(db, limit, Role::Admin, &template).await?);
            }
            DomainEvent::BookingStatusChanged {
                appointment_id,
                client_id,
                actor_id,
                current,
                ..
            } => {
                let booking = appointment::find_details_by_id(db, *appointment_id).await?;
                let result =
                    notify_for_booking_event(db, limit, &booking, BookingEvent::Status(*current))
                        .await;
                report.record(booking.client_id, result);

                if *current == AppointmentStatus::Cancelled && actor_id == client_id {
                    // Admins read a client's cancellation in the client's language.
                    let rendered = Template::ClientCancelled {
                        client_name: &booking.client_name,
                        service: &booking.service_name,
                        date: booking.date,
                        time: booking.time,
                    }
                    .render(booking.client_locale);
                    report.merge(
                        notify_admins(db, limit, &rendered.title, &rendered.message).await?,
                    );
                }
            }
            DomainEvent::BookingRescheduled {
                appointment_id,
                previous_date,
                previous_time,
                ..
            } => {
                let booking = appointment::find_details_by_id(db, *appointment_id).await?;
                let result = notify_for_booking_event(
                    db,
                    limit,
                    &booking,
                    BookingEvent::Updated {
                        old_date: *previous_date,
                        old_time: *previous_time,
                    },
                )
                .await;
                report.record(booking.client_id, result);

                let template = Template::ClientRescheduled {
                    client_name: &booking.client_name,
                    service: &booking.service_name,
                    old_date: *previous_date,
                    old_time: *previous_time,
                    new_date: booking.date,
                    new_time: booking.time,
                };
                report.merge(broadcast(db, limit, Role::Admin, &template).await?);
            }
            DomainEvent::StaffAssigned {
                appointment_id,
                staff_id,
                ..
            } => {
                let booking = appointment::find_details_by_id(db, *appointment_id).await?;
                let staff = user::find_by_id(db, *staff_id).await?;
                let rendered = Template::StaffAssignment {
                    date: booking.date,
                    time: booking.time,
                }
                .render(staff.locale);
                let result = notify_rendered(db, limit, staff.id, &rendered).await;
                report.record(staff.id, result);
            }
            DomainEvent::FeedbackReceived {
                appointment_id,
                rating,
                comment,
                ..
            } => {
                let booking = appointment::find_details_by_id(db, *appointment_id).await?;
                let template = Template::FeedbackReceived {
                    client_name: &booking.client_name,
                    rating: *rating,
                    comment: comment.as_deref(),
                };
                report.merge(broadcast(db, limit, Role::Admin, &template).await?);
            }
            DomainEvent::AnnouncementPublished { message, .. } => {
                let template = Template::Announcement { message };
                report.merge(broadcast(db, limit, Role::Client, &template).await?);
            }
            DomainEvent::StaffCheckedIn { staff_id, at } => {
                let staff_name = self.staff_name(*staff_id).await?;
                let template = Template::CheckIn {
                    staff_name: &staff_name,
                    at: *at,
                };
                report.merge(broadcast(db, limit, Role::Admin, &template).await?);
            }
            DomainEvent::StaffCheckedOut { staff_id, at } => {
                let staff_name = self.staff_name(*staff_id).await?;
                let template = Template::CheckOut {
                    staff_name: &staff_name,
                    at: *at,
                };
                report.merge(broadcast(db, limit, Role::Admin, &template).await?);
            }
        }

        Ok(report)
    }

    async fn staff_name(&self, staff_id: Id) -> Result<String, Error> {
        Ok(user::find_by_id(self.db.as_ref(), staff_id)
            .await?
            .full_name)
    }
}

#[async_trait]
impl EventHandler for NotificationDispatcher {
    async fn handle(&self, event: &DomainEvent) {
        match self.dispatch(event).await {
            Ok(report) if report.failed.is_empty() => {
                debug!(
                    "{} notified {} user(s)",
                    event.name(),
                    report.delivered.len()
                );
            }
            Ok(report) => {
                warn!(
                    "{} notified {} user(s), failed for {:?}",
                    event.name(),
                    report.delivered.len(),
                    report.failed
                );
            }
            Err(err) => {
                error!("Could not dispatch notifications for {}: {err}", event.name());
            }
        }
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::super::tests::{admin, stored};
    use super::*;
    use crate::users;
    use chrono::{NaiveDate, NaiveTime};
    use entity::locale::Locale;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction, Value};
    use std::collections::BTreeMap;

    fn booking_row(client_locale: &str, status: &str) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("id", 42i32.into()),
            ("client_id", 7i32.into()),
            ("client_name", "Sara".into()),
            ("client_locale", client_locale.into()),
            ("staff_id", Option::<i32>::None.into()),
            ("service_id", 3i32.into()),
            ("service_name", "قص الشعر".into()),
            ("date", NaiveDate::from_ymd_opt(2099, 1, 1).unwrap().into()),
            ("time", NaiveTime::from_hms_opt(10, 0, 0).unwrap().into()),
            ("status", status.into()),
            ("price", Decimal::new(8000, 2).into()),
            ("notes", Option::<String>::None.into()),
        ])
    }

    fn pruned() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    // Bound values of each notification INSERT: user_id, title, message, ...
    fn inserted(log: &[Transaction], column: usize) -> Vec<Value> {
        log.iter()
            .flat_map(|txn| txn.statements().iter())
            .filter(|stmt| stmt.sql.starts_with(r#"INSERT INTO "salon"."notifications""#))
            .filter_map(|stmt| stmt.values.as_ref().map(|values| values.0[column].clone()))
            .collect()
    }

    fn inserted_titles(log: &[Transaction]) -> Vec<Value> {
        inserted(log, 1)
    }

    fn staff_member(id: Id, locale: Locale) -> users::Model {
        users::Model {
            full_name: "Huda".to_string(),
            role: Role::Staff,
            ..admin(id, locale)
        }
    }

    fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
        Arc::into_inner(db)
            .expect("dispatcher released its handle")
            .into_transaction_log()
    }

    #[tokio::test]
    async fn client_cancellation_notifies_client_and_every_active_admin() -> Result<(), Error> {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking_row("ar", "cancelled")]])
                .append_query_results([[stored(100, 7, false)]])
                .append_query_results([[admin(1, Locale::En), admin(2, Locale::Ar)]])
                .append_query_results([[stored(101, 1, false)]])
                .append_query_results([[stored(102, 2, false)]])
                .append_exec_results([pruned(), pruned(), pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let report = dispatcher
            .dispatch(&DomainEvent::BookingStatusChanged {
                appointment_id: 42,
                client_id: 7,
                actor_id: 7,
                previous: AppointmentStatus::Pending,
                current: AppointmentStatus::Cancelled,
            })
            .await?;

        assert_eq!(report.delivered, vec![7, 1, 2]);
        assert!(report.failed.is_empty());

        drop(dispatcher);
        let log = Arc::into_inner(db)
            .expect("dispatcher released its handle")
            .into_transaction_log();
        // Client first, then both admins in the client's language even though admin 1 reads English.
        assert_eq!(inserted_titles(&log), vec![Value::from("تم إلغاء الحجز"); 3]);

        Ok(())
    }

    #[tokio::test]
    async fn staff_status_change_only_notifies_the_client() -> Result<(), Error> {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking_row("en", "confirmed")]])
                .append_query_results([[stored(100, 7, false)]])
                .append_exec_results([pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let report = dispatcher
            .dispatch(&DomainEvent::BookingStatusChanged {
                appointment_id: 42,
                client_id: 7,
                actor_id: 5,
                previous: AppointmentStatus::Pending,
                current: AppointmentStatus::Confirmed,
            })
            .await?;

        assert_eq!(report.delivered, vec![7]);

        drop(dispatcher);
        let log = Arc::into_inner(db)
            .expect("dispatcher released its handle")
            .into_transaction_log();
        assert_eq!(inserted_titles(&log), vec![Value::from("Booking confirmed")]);

        Ok(())
    }

    #[tokio::test]
    async fn announcement_reaches_active_clients() -> Result<(), Error> {
        let mut client = admin(7, Locale::Ar);
        client.role = Role::Client;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[client]])
                .append_query_results([[stored(100, 7, false)]])
                .append_exec_results([pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let report = dispatcher
            .dispatch(&DomainEvent::AnnouncementPublished {
                author_id: 1,
                message: "مغلق يوم الجمعة".to_string(),
            })
            .await?;

        assert_eq!(report.delivered, vec![7]);

        Ok(())
    }

    #[tokio::test]
    async fn new_booking_tells_the_client_it_is_pending_and_alerts_admins() -> Result<(), Error> {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking_row("ar", "pending")]])
                .append_query_results([[stored(100, 7, false)]])
                .append_query_results([[admin(1, Locale::Ar), admin(2, Locale::En)]])
                .append_query_results([[stored(101, 1, false)]])
                .append_query_results([[stored(102, 2, false)]])
                .append_exec_results([pruned(), pruned(), pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let report = dispatcher
            .dispatch(&DomainEvent::BookingCreated {
                appointment_id: 42,
                client_id: 7,
            })
            .await?;

        assert_eq!(report.delivered, vec![7, 1, 2]);

        drop(dispatcher);
        let log = transaction_log(db);
        assert_eq!(
            inserted_titles(&log),
            vec![
                Value::from("الحجز قيد المراجعة"),
                Value::from("حجز جديد"),
                Value::from("New booking"),
            ]
        );
        assert_eq!(
            inserted(&log, 0),
            vec![Value::from(7i32), Value::from(1i32), Value::from(2i32)]
        );

        Ok(())
    }

    #[tokio::test]
    async fn reschedule_tells_the_client_both_slots_and_alerts_admins() -> Result<(), Error> {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking_row("en", "pending")]])
                .append_query_results([[stored(100, 7, false)]])
                .append_query_results([[admin(1, Locale::Ar)]])
                .append_query_results([[stored(101, 1, false)]])
                .append_exec_results([pruned(), pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let report = dispatcher
            .dispatch(&DomainEvent::BookingRescheduled {
                appointment_id: 42,
                client_id: 7,
                previous_date: NaiveDate::from_ymd_opt(2098, 12, 30).unwrap(),
                previous_time: NaiveTime::from_hms_opt(16, 15, 0).unwrap(),
            })
            .await?;

        assert_eq!(report.delivered, vec![7, 1]);

        drop(dispatcher);
        let log = transaction_log(db);
        assert_eq!(
            inserted_titles(&log),
            vec![Value::from("Booking updated"), Value::from("تعديل حجز")]
        );
        assert_eq!(
            inserted(&log, 2)[0],
            Value::from(
                "Your booking for قص الشعر has been moved from 2098-12-30 at 16:15 to 2099-01-01 at 10:00."
            )
        );

        Ok(())
    }

    #[tokio::test]
    async fn staff_assignment_notifies_only_the_assignee() -> Result<(), Error> {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking_row("en", "confirmed")]])
                .append_query_results([[staff_member(5, Locale::Ar)]])
                .append_query_results([[stored(100, 5, false)]])
                .append_exec_results([pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let report = dispatcher
            .dispatch(&DomainEvent::StaffAssigned {
                appointment_id: 42,
                client_id: 7,
                staff_id: 5,
            })
            .await?;

        assert_eq!(report.delivered, vec![5]);

        drop(dispatcher);
        let log = transaction_log(db);
        assert_eq!(inserted(&log, 0), vec![Value::from(5i32)]);
        assert_eq!(inserted_titles(&log), vec![Value::from("تم تعيين موعد جديد")]);

        Ok(())
    }

    #[tokio::test]
    async fn feedback_reaches_every_active_admin() -> Result<(), Error> {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[booking_row("ar", "completed")]])
                .append_query_results([[admin(1, Locale::Ar), admin(2, Locale::En)]])
                .append_query_results([[stored(101, 1, false)]])
                .append_query_results([[stored(102, 2, false)]])
                .append_exec_results([pruned(), pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let report = dispatcher
            .dispatch(&DomainEvent::FeedbackReceived {
                appointment_id: 42,
                client_id: 7,
                rating: 5,
                comment: Some("Lovely".to_string()),
            })
            .await?;

        assert_eq!(report.delivered, vec![1, 2]);

        drop(dispatcher);
        let log = transaction_log(db);
        assert_eq!(
            inserted_titles(&log),
            vec![
                Value::from("تم استلام تقييم جديد"),
                Value::from("New feedback received"),
            ]
        );
        assert_eq!(
            inserted(&log, 2)[1],
            Value::from("New feedback from Sara (5/5): Lovely")
        );

        Ok(())
    }

    #[tokio::test]
    async fn check_in_and_check_out_alert_admins_with_the_staff_name() -> Result<(), Error> {
        let at = NaiveDate::from_ymd_opt(2099, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[staff_member(5, Locale::Ar)]])
                .append_query_results([[admin(1, Locale::En)]])
                .append_query_results([[stored(101, 1, false)]])
                .append_query_results([[staff_member(5, Locale::Ar)]])
                .append_query_results([[admin(1, Locale::Ar)]])
                .append_query_results([[stored(102, 1, false)]])
                .append_exec_results([pruned(), pruned()])
                .into_connection(),
        );
        let dispatcher = NotificationDispatcher::new(&db, 100);

        let checked_in = dispatcher
            .dispatch(&DomainEvent::StaffCheckedIn { staff_id: 5, at })
            .await?;
        let checked_out = dispatcher
            .dispatch(&DomainEvent::StaffCheckedOut { staff_id: 5, at })
            .await?;

        assert_eq!(checked_in.delivered, vec![1]);
        assert_eq!(checked_out.delivered, vec![1]);

        drop(dispatcher);
        let log = transaction_log(db);
        assert_eq!(
            inserted_titles(&log),
            vec![Value::from("Staff check-in"), Value::from("إشعار تسجيل خروج")]
        );
        assert_eq!(
            inserted(&log, 2)[0],
            Value::from("Huda checked in on 2099-01-01 at 09:00.")
        );

        Ok(())
    }
}
