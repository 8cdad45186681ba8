use super::error::Error;
use entity::services::{Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ConnectionTrait};

/// A service that can still be booked. Inactive services read as missing.
pub async fn find_active_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn find_active_by_id_hides_retired_services() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = find_active_by_id(&db, 3).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
