use password_auth::generate_hash;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DbBackend, Statement, Value};

const ADMIN_EMAIL: &str = "admin@salon.local";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        insert_initial_admin(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "DELETE FROM salon.users WHERE email = $1",
                vec![Value::String(Some(Box::new(ADMIN_EMAIL.to_owned())))],
            ))
            .await?;

        Ok(())
    }
}

// Raw SQL keeps this migration independent of later changes to the users entity.
async fn insert_initial_admin(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let password_hash = generate_hash("password");

    let user_sql = r#"
        INSERT INTO salon.users (full_name, email, password, role, locale)
        VALUES ($1, $2, $3, 'admin', 'ar')
        ON CONFLICT (email) DO NOTHING
    "#;
    manager
        .get_connection()
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            user_sql,
            vec![
                Value::String(Some(Box::new("Salon Admin".to_owned()))),
                Value::String(Some(Box::new(ADMIN_EMAIL.to_owned()))),
                Value::String(Some(Box::new(password_hash))),
            ],
        ))
        .await?;

    Ok(())
}
