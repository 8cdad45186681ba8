//! `SeaORM` Entity for appointments (bookings).
//!
//! Rows are never deleted: cancellation is a status value.

use crate::{appointment_status::AppointmentStatus, Id};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = domain::appointments::Model)]
#[sea_orm(schema_name = "salon", table_name = "appointments")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    /// Owning client; fixed at creation.
    pub client_id: Id,
    pub staff_id: Option<Id>,
    pub service_id: Id,
    #[schema(value_type = String, format = Date)]
    pub date: Date,
    #[schema(value_type = String, example = "10:00:00")]
    pub time: Time,
    pub status: AppointmentStatus,
    /// Price of the service at the moment of booking.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    #[schema(value_type = String, example = "45.00")]
    pub price: Decimal,
    pub notes: Option<String>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// The wall-clock moment the appointment starts.
    pub fn starts_at(&self) -> DateTime {
        self.date.and_time(self.time)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ClientId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StaffId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Staff,
    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceId",
        to = "super::services::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Service,
    #[sea_orm(has_one = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
