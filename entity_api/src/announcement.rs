use super::error::Error;
use chrono::Utc;
use entity::announcements::{ActiveModel, Column, Entity};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, QueryOrder};

pub use entity::announcements::Model;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub message: String,
    pub created_by: Id,
}

/// Stores a new announcement. It starts out active.
pub async fn create(db: &impl ConnectionTrait, new: NewAnnouncement) -> Result<Model, Error> {
    debug!("New Announcement to be inserted: {new:?}");

    Ok(ActiveModel {
        message: Set(new.message),
        created_by: Set(new.created_by),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Every announcement, newest first.
pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?)
}

/// Announcements clients currently see, newest first.
pub async fn find_active(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::IsActive.eq(true))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?)
}

/// Flips `is_active` in a single statement and returns the row as it now is.
pub async fn toggle(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    debug!("Toggling announcement {id}");

    Entity::update_many()
        .col_expr(Column::IsActive, Expr::col(Column::IsActive).not())
        .filter(Column::Id.eq(id))
        .exec_with_returning(db)
        .await?
        .pop()
        .ok_or_else(Error::not_found)
}

pub async fn delete(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found());
    }

    info!("Announcement {id} deleted");
    Ok(())
}
