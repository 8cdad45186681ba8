pub mod prelude;

pub mod announcements;
pub mod appointment_status;
pub mod appointments;
pub mod feedback;
pub mod locale;
pub mod notifications;
pub mod roles;
pub mod services;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = i32;
