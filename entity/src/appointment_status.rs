use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of an appointment through its lifecycle.
///
/// `Completed` and `Cancelled` are terminal: no transition leaves them.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "appointment_status"
)]
pub enum AppointmentStatus {
    /// Booked by the client, awaiting confirmation
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Accepted by the salon
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Statuses a booking may still leave.
    pub fn open() -> [AppointmentStatus; 2] {
        [AppointmentStatus::Pending, AppointmentStatus::Confirmed]
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(fmt, "pending"),
            AppointmentStatus::Confirmed => write!(fmt, "confirmed"),
            AppointmentStatus::Completed => write!(fmt, "completed"),
            AppointmentStatus::Cancelled => write!(fmt, "cancelled"),
        }
    }
}
