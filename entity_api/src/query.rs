use crate::error::Error;
use sea_orm::strum::IntoEnumIterator;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Value};
use std::collections::HashMap;

/// `QueryFilterMap` carries equality filters from the callers down to the database query
/// layer. Keys are column names, values are optional `sea_orm` values; a `None` value is
/// treated the same as an absent key.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::query::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("is_active".to_string(), Some(Value::Bool(Some(true))));
/// assert!(query_filter_map.get("is_active").is_some());
/// ```
#[derive(Debug, Default)]
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

/// Find all records of an entity by the given query filter map.
pub async fn find_by<E, C>(
    db: &impl ConnectionTrait,
    query_filter_map: QueryFilterMap,
) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait + IntoEnumIterator,
{
    let mut query = E::find();

    // We iterate through the entity's defined columns so that we only attempt
    // to filter by columns that exist.
    for column in C::iter() {
        if let Some(value) = query_filter_map.get(&column.to_string()) {
            query = query.filter(column.eq(value));
        }
    }

    Ok(query.all(db).await?)
}


#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use entity::services;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    #[tokio::test]
    async fn find_by_ignores_keys_that_are_not_columns() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<services::Model>::new()])
            .into_connection();

        let mut map = QueryFilterMap::new();
        map.insert("is_active".to_string(), Some(Value::Bool(Some(true))));
        map.insert("not_a_column".to_string(), Some(Value::Int(Some(1))));

        find_by::<services::Entity, services::Column>(&db, map).await?;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "services"."id", "services"."name", "services"."description", "services"."price", "services"."is_active", "services"."created_at", "services"."updated_at" FROM "salon"."services" WHERE "services"."is_active" = $1"#,
                [true.into()]
            )]
        );

        Ok(())
    }
}
