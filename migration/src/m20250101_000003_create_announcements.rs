use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_announcements_sql = r#"
            CREATE TABLE IF NOT EXISTS salon.announcements (
                id SERIAL PRIMARY KEY,
                message TEXT NOT NULL,
                created_by INTEGER NOT NULL
                    REFERENCES salon.users(id) ON UPDATE CASCADE ON DELETE CASCADE,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        manager
            .get_connection()
            .execute_unprepared(create_announcements_sql)
            .await?;

        // Clients only ever read the active ones, newest first
        manager
            .create_index(
                Index::create()
                    .name("announcements_is_active_created_at")
                    .table((Alias::new("salon"), Alias::new("announcements")))
                    .col(Alias::new("is_active"))
                    .col((Alias::new("created_at"), IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS salon.announcements")
            .await?;

        Ok(())
    }
}
