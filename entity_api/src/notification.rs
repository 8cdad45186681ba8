use super::error::Error;
use chrono::Utc;
use entity::notifications::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, Order, Query},
    ActiveValue::Set,
    ConnectionTrait, PaginatorTrait, QueryOrder, QuerySelect, TransactionTrait,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Id,
    pub title: String,
    pub message: String,
}

/// Inserts a notification and prunes the recipient's oldest ones so that at most
/// `retention_limit` remain. Both statements run in one transaction; the new row is
/// always among the survivors.
pub async fn create_with_retention(
    db: &impl TransactionTrait,
    new: NewNotification,
    retention_limit: u64,
) -> Result<Model, Error> {
    debug!(
        "Inserting notification for user {} (retention {retention_limit})",
        new.user_id
    );

    let txn = db.begin().await?;

    let user_id = new.user_id;
    let notification = ActiveModel {
        user_id: Set(new.user_id),
        title: Set(new.title),
        message: Set(new.message),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let pruned = prune(&txn, user_id, rows_to_keep(retention_limit)).await?;
    if pruned > 0 {
        trace!("Pruned {pruned} old notifications for user {user_id}");
    }

    txn.commit().await?;

    Ok(notification)
}

// Never prune the row that was just inserted.
fn rows_to_keep(retention_limit: u64) -> u64 {
    retention_limit.max(1)
}

/// Deletes every notification of `user_id` outside the newest `keep`.
async fn prune(db: &impl ConnectionTrait, user_id: Id, keep: u64) -> Result<u64, Error> {
    let newest = Query::select()
        .column(Column::Id)
        .from(Entity.table_ref())
        .and_where(Expr::col(Column::UserId).eq(user_id))
        .order_by(Column::CreatedAt, Order::Desc)
        .order_by(Column::Id, Order::Desc)
        .limit(keep)
        .to_owned();

    let result = Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Id.not_in_subquery(newest))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// A user's notifications, newest first.
pub async fn find_by_user(
    db: &impl ConnectionTrait,
    user_id: Id,
    limit: Option<u64>,
) -> Result<Vec<Model>, Error> {
    let query = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .limit(limit);

    Ok(query.all(db).await?)
}

pub async fn count_unread(db: &impl ConnectionTrait, user_id: Id) -> Result<u64, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsRead.eq(false))
        .count(db)
        .await?)
}

/// Marks one notification read if it belongs to `user_id`. Returns the number of rows
/// matched: 1 for an owned notification whether or not it was already read, 0 otherwise.
pub async fn mark_read(db: &impl ConnectionTrait, id: Id, user_id: Id) -> Result<u64, Error> {
    let result = Entity::update_many()
        .col_expr(Column::IsRead, Expr::value(true))
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn mark_all_read(db: &impl ConnectionTrait, user_id: Id) -> Result<u64, Error> {
    let result = Entity::update_many()
        .col_expr(Column::IsRead, Expr::value(true))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod retention_tests {
    use super::*;

    #[test]
    fn rows_to_keep_always_includes_the_new_notification() {
        assert_eq!(rows_to_keep(0), 1);
        assert_eq!(rows_to_keep(1), 1);
        assert_eq!(rows_to_keep(100), 100);
    }
}
