//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. Entity models, ids and the shared enums are all
//! reachable from here.
pub use entity_api::appointment::AppointmentDetails;

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    announcements, appointment_status, appointments, locale, notifications, roles, services,
    users, Id,
};

pub use events;

pub mod actor;
pub mod announcement;
pub mod attendance;
pub mod booking;
pub mod error;
pub mod feedback;
pub mod notification;
pub mod user;
