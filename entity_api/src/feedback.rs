use super::error::Error;
use chrono::Utc;
use entity::feedback::{ActiveModel, Column, Entity};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

pub use entity::feedback::Model;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFeedback {
    pub appointment_id: Id,
    pub client_id: Id,
    pub rating: i16,
    pub comment: Option<String>,
}

pub async fn create(db: &impl ConnectionTrait, new: NewFeedback) -> Result<Model, Error> {
    debug!("New Feedback to be inserted: {new:?}");

    Ok(ActiveModel {
        appointment_id: Set(new.appointment_id),
        client_id: Set(new.client_id),
        rating: Set(new.rating),
        comment: Set(new.comment),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn find_by_appointment_id(
    db: &impl ConnectionTrait,
    appointment_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::AppointmentId.eq(appointment_id))
        .one(db)
        .await?)
}
