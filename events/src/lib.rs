//! Event system for the salon booking service.
//!
//! Domain operations publish a [`DomainEvent`] after their database change has been
//! committed. Handlers (the in-app notification dispatcher being the main one) react to
//! those events. A handler never reports failure back to the publisher, so nothing a
//! handler does can undo or fail the operation that raised the event.
//!
//! Events carry ids plus whatever cannot be read back later (previous slot, check-in time).
//! Handlers read names and locales at the time they run.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use entity::appointment_status::AppointmentStatus;
use log::*;
use std::sync::Arc;

pub use entity::Id;

/// Business-level changes in the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// A client booked a new appointment. It starts out `pending`.
    BookingCreated { appointment_id: Id, client_id: Id },
    /// An appointment moved from `previous` to `current`.
    BookingStatusChanged {
        appointment_id: Id,
        client_id: Id,
        /// Who made the change: the client for cancellations, staff or admin otherwise.
        actor_id: Id,
        previous: AppointmentStatus,
        current: AppointmentStatus,
    },
    /// A client moved an appointment to another slot or service; it is `pending` again.
    BookingRescheduled {
        appointment_id: Id,
        client_id: Id,
        previous_date: NaiveDate,
        previous_time: NaiveTime,
    },
    StaffAssigned {
        appointment_id: Id,
        client_id: Id,
        staff_id: Id,
    },
    /// A client rated a completed appointment.
    FeedbackReceived {
        appointment_id: Id,
        client_id: Id,
        rating: i16,
        comment: Option<String>,
    },
    /// An admin broadcast a message to every active client.
    AnnouncementPublished { author_id: Id, message: String },
    /// `at` is salon-local wall-clock time.
    StaffCheckedIn { staff_id: Id, at: NaiveDateTime },
    StaffCheckedOut { staff_id: Id, at: NaiveDateTime },
}

impl DomainEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::BookingCreated { .. } => "booking_created",
            DomainEvent::BookingStatusChanged { .. } => "booking_status_changed",
            DomainEvent::BookingRescheduled { .. } => "booking_rescheduled",
            DomainEvent::StaffAssigned { .. } => "staff_assigned",
            DomainEvent::FeedbackReceived { .. } => "feedback_received",
            DomainEvent::AnnouncementPublished { .. } => "announcement_published",
            DomainEvent::StaffCheckedIn { .. } => "staff_checked_in",
            DomainEvent::StaffCheckedOut { .. } => "staff_checked_out",
        }
    }
}

/// Trait for handling domain events.
/// Implementations perform side effects such as writing notifications. Errors are the
/// handler's to log; they are not returned.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers, awaiting each in turn.
    pub async fn publish(&self, event: DomainEvent) {
        trace!(
            "Publishing {} to {} handler(s)",
            event.name(),
            self.handlers.len()
        );
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        seen: Arc<Mutex<Vec<(&'static str, &'static str)>>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            self.seen.lock().unwrap().push((self.label, event.name()));
        }
    }

    #[tokio::test]
    async fn publish_calls_handlers_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(Recorder {
                label: "first",
                seen: Arc::clone(&seen),
            }))
            .with_handler(Arc::new(Recorder {
                label: "second",
                seen: Arc::clone(&seen),
            }));

        publisher
            .publish(DomainEvent::BookingCreated {
                appointment_id: 42,
                client_id: 7,
            })
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", "booking_created"), ("second", "booking_created")]
        );
    }

    #[tokio::test]
    async fn with_handler_leaves_earlier_clones_untouched() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bare = EventPublisher::new();
        let wired = bare.clone().with_handler(Arc::new(Recorder {
            label: "only",
            seen: Arc::clone(&seen),
        }));

        bare.publish(DomainEvent::AnnouncementPublished {
            author_id: 1,
            message: "Closed on Friday".to_string(),
        })
        .await;

        assert_eq!(bare.handler_count(), 0);
        assert_eq!(wired.handler_count(), 1);
        assert!(seen.lock().unwrap().is_empty());
    }
}
