//! Admin announcements. Each one is stored so admins can retire or remove it later, and
//! publishing one also notifies every active client.

use crate::actor::Actor;
use crate::error::{Error, Resource, ValidationErrorKind};
use crate::events::{DomainEvent, EventPublisher};
use crate::{announcements, Id};
use entity::roles::Role;
use entity_api::announcement::{self, NewAnnouncement};
use log::*;
use sea_orm::DatabaseConnection;

/// An admin stores `message` as an active announcement and broadcasts it to every active
/// client.
pub async fn publish(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor: &Actor,
    message: &str,
) -> Result<announcements::Model, Error> {
    actor.require(Role::Admin)?;

    let message = message.trim();
    if message.is_empty() {
        return Err(Error::validation(ValidationErrorKind::EmptyMessage));
    }

    let announcement = announcement::create(
        db,
        NewAnnouncement {
            message: message.to_string(),
            created_by: actor.id,
        },
    )
    .await?;

    info!(
        "Admin {} published announcement {}",
        actor.id, announcement.id
    );

    event_publisher
        .publish(DomainEvent::AnnouncementPublished {
            author_id: actor.id,
            message: announcement.message.clone(),
        })
        .await;

    Ok(announcement)
}

/// Every announcement, active or not, for the admin screen.
pub async fn list(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<announcements::Model>, Error> {
    actor.require(Role::Admin)?;
    Ok(announcement::find_all(db).await?)
}

/// What clients are shown right now.
pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<announcements::Model>, Error> {
    Ok(announcement::find_active(db).await?)
}

/// Shows a hidden announcement again or hides a shown one. Nobody is notified either way.
pub async fn toggle(
    db: &DatabaseConnection,
    actor: &Actor,
    announcement_id: Id,
) -> Result<announcements::Model, Error> {
    actor.require(Role::Admin)?;

    let announcement = announcement::toggle(db, announcement_id)
        .await
        .map_err(Error::lookup(Resource::Announcement))?;

    info!(
        "Admin {} set announcement {announcement_id} active={}",
        actor.id, announcement.is_active
    );

    Ok(announcement)
}

pub async fn delete(db: &DatabaseConnection, actor: &Actor, announcement_id: Id) -> Result<(), Error> {
    actor.require(Role::Admin)?;

    announcement::delete(db, announcement_id)
        .await
        .map_err(Error::lookup(Resource::Announcement))
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{BookingErrorKind, DomainErrorKind};
    use async_trait::async_trait;
    use chrono::Utc;
    use events::EventHandler;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Captured(Mutex<Vec<DomainEvent>>);

    #[async_trait]
    impl EventHandler for Captured {
        async fn handle(&self, event: &DomainEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn stored(id: Id, is_active: bool) -> announcements::Model {
        announcements::Model {
            id,
            message: "مغلق يوم الجمعة".to_string(),
            created_by: 1,
            is_active,
            created_at: Utc::now().into(),
        }
    }

    fn admin() -> Actor {
        Actor::new(1, Role::Admin)
    }

    #[tokio::test]
    async fn only_admins_may_announce() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = publish(
            &db,
            &EventPublisher::default(),
            &Actor::new(5, Role::Staff),
            "Closed on Friday",
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Booking(BookingErrorKind::Unauthorized)
        );
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn blank_announcements_are_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = publish(&db, &EventPublisher::default(), &admin(), "   ")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Booking(BookingErrorKind::Validation(
                ValidationErrorKind::EmptyMessage
            ))
        );
    }

    #[tokio::test]
    async fn publish_stores_the_announcement_then_broadcasts_it() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored(4, true)]])
            .into_connection();
        let captured = Arc::new(Captured::default());
        let publisher = EventPublisher::new().with_handler(captured.clone());

        let announcement = publish(&db, &publisher, &admin(), "  مغلق يوم الجمعة ").await?;

        assert_eq!(announcement.id, 4);
        assert!(announcement.is_active);
        assert_eq!(
            *captured.0.lock().unwrap(),
            vec![DomainEvent::AnnouncementPublished {
                author_id: 1,
                message: "مغلق يوم الجمعة".to_string(),
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn clients_may_read_active_announcements_but_not_manage_them() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored(4, true)]])
            .into_connection();
        let client = Actor::new(7, Role::Client);

        assert_eq!(list_active(&db).await?.len(), 1);
        for err in [
            list(&db, &client).await.unwrap_err(),
            toggle(&db, &client, 4).await.unwrap_err(),
            delete(&db, &client, 4).await.unwrap_err(),
        ] {
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Booking(BookingErrorKind::Unauthorized)
            );
        }
        assert_eq!(db.into_transaction_log().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn toggle_returns_the_new_state_without_notifying() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored(4, false)]])
            .into_connection();

        let toggled = toggle(&db, &admin(), 4).await?;

        assert!(!toggled.is_active);
        assert_eq!(db.into_transaction_log().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_missing_announcement_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = delete(&db, &admin(), 99).await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Booking(BookingErrorKind::NotFound(Resource::Announcement))
        );
    }
}
