//! Staff check-in and check-out. Admins are told; nothing is stored besides the notifications.

use crate::actor::Actor;
use crate::error::Error;
use crate::events::{DomainEvent, EventPublisher};
use chrono::NaiveDateTime;
use entity::roles::Role;
use log::*;

/// `now` is the salon-local time stamped on the admins' notification.
pub async fn check_in(
    event_publisher: &EventPublisher,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<(), Error> {
    actor.require(Role::Staff)?;
    info!("Staff {} checked in at {now}", actor.id);

    event_publisher
        .publish(DomainEvent::StaffCheckedIn {
            staff_id: actor.id,
            at: now,
        })
        .await;

    Ok(())
}

pub async fn check_out(
    event_publisher: &EventPublisher,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<(), Error> {
    actor.require(Role::Staff)?;
    info!("Staff {} checked out at {now}", actor.id);

    event_publisher
        .publish(DomainEvent::StaffCheckedOut {
            staff_id: actor.id,
            at: now,
        })
        .await;

    Ok(())
}


// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(test)]
#[cfg(feature = "mock")]
mod dispatch_tests {
    use super::*;
    use crate::notification::NotificationDispatcher;
    use crate::{notifications, users};
    use chrono::{NaiveDate, Utc};
    use entity::locale::Locale;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn user(id: i32, full_name: &str, role: Role) -> users::Model {
        let now = Utc::now();
        users::Model {
            id,
            full_name: full_name.to_string(),
            email: format!("user{id}@salon.local"),
            password: String::new(),
            role,
            locale: Locale::En,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn stored(id: i32, user_id: i32) -> notifications::Model {
        notifications::Model {
            id,
            user_id,
            title: "Staff check-in".to_string(),
            message: String::new(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn check_in_and_out_notify_the_admins() -> Result<(), Error> {
        let now = NaiveDate::from_ymd_opt(2099, 1, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user(5, "Huda", Role::Staff)]])
                .append_query_results([[user(1, "Noura", Role::Admin)]])
                .append_query_results([[stored(10, 1)]])
                .append_query_results([[user(5, "Huda", Role::Staff)]])
                .append_query_results([[user(1, "Noura", Role::Admin)]])
                .append_query_results([[stored(11, 1)]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );
        let publisher =
            EventPublisher::new().with_handler(Arc::new(NotificationDispatcher::new(&db, 100)));
        let staff = Actor::new(5, Role::Staff);

        check_in(&publisher, &staff, now).await?;
        check_out(&publisher, &staff, now).await?;

        drop(publisher);
        let log = Arc::into_inner(db)
            .expect("publisher released its handle")
            .into_transaction_log();
        let messages: Vec<Value> = log
            .iter()
            .flat_map(|txn| txn.statements().iter())
            .filter(|stmt| stmt.sql.starts_with(r#"INSERT INTO "salon"."notifications""#))
            .filter_map(|stmt| stmt.values.as_ref().map(|values| values.0[2].clone()))
            .collect();
        assert_eq!(
            messages,
            vec![
                Value::from("Huda checked in on 2099-01-01 at 08:30."),
                Value::from("Huda checked out on 2099-01-01 at 08:30."),
            ]
        );

        Ok(())
    }
}
