pub use super::announcements::Entity as Announcements;
pub use super::appointments::Entity as Appointments;
pub use super::feedback::Entity as Feedback;
pub use super::notifications::Entity as Notifications;
pub use super::services::Entity as Services;
pub use super::users::Entity as Users;
