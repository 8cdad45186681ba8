//! Entity API for appointments.
//!
//! Every mutation is a single conditional `UPDATE` whose predicate includes the id, the
//! ownership column for the caller's scope and the status the caller last observed. The
//! returned affected-row count is the only concurrency control: zero means the row is
//! missing, not visible to the caller, or changed since it was read.

use chrono::Utc;
use entity::appointments::{ActiveModel, Column, Entity, Model, Relation};
use entity::{appointment_status::AppointmentStatus, locale::Locale, services, users, Id};
use log::*;
use rust_decimal::Decimal;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Alias, Expr},
    ActiveEnum, ActiveValue::Set, Condition, ConnectionTrait, FromQueryResult, JoinType,
    QueryOrder, QuerySelect, Select,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::Error;

/// Whose appointments a query or mutation may touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Only appointments owned by this client
    Client(Id),
    /// Only appointments assigned to this staff member
    Staff(Id),
    /// No ownership restriction (admins)
    Any,
}

impl Scope {
    fn condition(&self) -> Condition {
        match self {
            Scope::Client(client_id) => Condition::all().add(Column::ClientId.eq(*client_id)),
            Scope::Staff(staff_id) => Condition::all().add(Column::StaffId.eq(*staff_id)),
            Scope::Any => Condition::all(),
        }
    }
}

/// An appointment joined with the names the calendar and notifications need.
/// `service_name` and `client_name` are read at query time, never frozen on the row.
#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize, ToSchema)]
pub struct AppointmentDetails {
    pub id: Id,
    pub client_id: Id,
    pub client_name: String,
    pub client_locale: Locale,
    pub staff_id: Option<Id>,
    pub service_id: Id,
    pub service_name: String,
    #[schema(value_type = String, format = Date)]
    pub date: Date,
    #[schema(value_type = String, example = "10:00:00")]
    pub time: Time,
    pub status: AppointmentStatus,
    #[schema(value_type = String, example = "45.00")]
    pub price: Decimal,
    pub notes: Option<String>,
}

/// Values for a new booking. Status always starts as `pending`.
#[derive(Clone, Debug)]
pub struct NewAppointment {
    pub client_id: Id,
    pub service_id: Id,
    pub date: Date,
    pub time: Time,
    pub price: Decimal,
    pub notes: Option<String>,
}

/// The slot and service a client moves an existing booking to.
#[derive(Clone, Debug)]
pub struct NewSlot {
    pub service_id: Id,
    pub date: Date,
    pub time: Time,
    pub price: Decimal,
}

/// Narrows `list_by_date_range`.
#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    pub status: Option<AppointmentStatus>,
    pub scope: Option<Scope>,
}

pub async fn create(db: &impl ConnectionTrait, new: NewAppointment) -> Result<Model, Error> {
    debug!("New Appointment to be inserted: {new:?}");

    let now = Utc::now();
    let active_model = ActiveModel {
        client_id: Set(new.client_id),
        staff_id: Set(None),
        service_id: Set(new.service_id),
        date: Set(new.date),
        time: Set(new.time),
        status: Set(AppointmentStatus::Pending),
        price: Set(new.price),
        notes: Set(new.notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Finds an appointment only if it belongs to `client_id`. A foreign appointment and a
/// missing one produce the same `RecordNotFound`.
pub async fn find_by_client_and_id(
    db: &impl ConnectionTrait,
    client_id: Id,
    id: Id,
) -> Result<Model, Error> {
    find_scoped(db, Scope::Client(client_id), id).await
}

pub async fn find_scoped(db: &impl ConnectionTrait, scope: Scope, id: Id) -> Result<Model, Error> {
    Entity::find()
        .filter(Column::Id.eq(id))
        .filter(scope.condition())
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

fn details_query() -> Select<Entity> {
    Entity::find()
        .select_only()
        .columns([
            Column::Id,
            Column::ClientId,
            Column::StaffId,
            Column::ServiceId,
            Column::Date,
            Column::Time,
            Column::Status,
            Column::Price,
            Column::Notes,
        ])
        .column_as(users::Column::FullName, "client_name")
        .expr_as(
            Expr::col((users::Entity, users::Column::Locale)).cast_as(Alias::new("text")),
            "client_locale",
        )
        .column_as(services::Column::Name, "service_name")
        .join(JoinType::InnerJoin, Relation::Service.def())
        .join(JoinType::InnerJoin, Relation::Client.def())
}

/// Reads an appointment with its service name and client name in a single query.
pub async fn find_details_by_id(
    db: &impl ConnectionTrait,
    id: Id,
) -> Result<AppointmentDetails, Error> {
    details_query()
        .filter(Column::Id.eq(id))
        .into_model::<AppointmentDetails>()
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Appointments whose date falls within `from..=to`, ordered by date then time.
pub async fn list_by_date_range(
    db: &impl ConnectionTrait,
    from: Date,
    to: Date,
    filter: ListFilter,
) -> Result<Vec<AppointmentDetails>, Error> {
    debug!("Listing appointments from {from} to {to} with filter {filter:?}");

    let mut query = details_query()
        .filter(Column::Date.between(from, to))
        .order_by_asc(Column::Date)
        .order_by_asc(Column::Time);

    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(status));
    }
    if let Some(scope) = filter.scope {
        query = query.filter(scope.condition());
    }

    Ok(query.into_model::<AppointmentDetails>().all(db).await?)
}

/// Moves an appointment from `expected` to `new_status`. Returns the number of rows
/// changed, which is 0 when the row is not visible in `scope` or no longer `expected`.
pub async fn update_status(
    db: &impl ConnectionTrait,
    id: Id,
    scope: Scope,
    expected: AppointmentStatus,
    new_status: AppointmentStatus,
) -> Result<u64, Error> {
    debug!("Updating appointment {id} status {expected} -> {new_status} in scope {scope:?}");

    let result = Entity::update_many()
        .col_expr(Column::Status, new_status.as_enum())
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(Utc::now())),
        )
        .filter(Column::Id.eq(id))
        .filter(Column::Status.eq(expected))
        .filter(scope.condition())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Assigns `staff_id` to an appointment that is still open. Status is untouched.
pub async fn assign_staff(db: &impl ConnectionTrait, id: Id, staff_id: Id) -> Result<u64, Error> {
    debug!("Assigning staff {staff_id} to appointment {id}");

    let result = Entity::update_many()
        .col_expr(Column::StaffId, Expr::value(Some(staff_id)))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(Utc::now())),
        )
        .filter(Column::Id.eq(id))
        .filter(Column::Status.is_in(AppointmentStatus::open()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Moves a client's open appointment to a new slot and puts it back to `pending`.
pub async fn reschedule(
    db: &impl ConnectionTrait,
    id: Id,
    client_id: Id,
    expected: AppointmentStatus,
    slot: NewSlot,
) -> Result<u64, Error> {
    debug!("Rescheduling appointment {id} for client {client_id} to {slot:?}");

    let result = Entity::update_many()
        .col_expr(Column::ServiceId, Expr::value(slot.service_id))
        .col_expr(Column::Date, Expr::value(slot.date))
        .col_expr(Column::Time, Expr::value(slot.time))
        .col_expr(Column::Price, Expr::value(slot.price))
        .col_expr(Column::Status, AppointmentStatus::Pending.as_enum())
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(Utc::now())),
        )
        .filter(Column::Id.eq(id))
        .filter(Column::Status.eq(expected))
        .filter(Scope::Client(client_id).condition())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
