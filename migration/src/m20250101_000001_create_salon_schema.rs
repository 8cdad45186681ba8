use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE SCHEMA IF NOT EXISTS salon;")
            .await?;
        db.execute_unprepared("SET search_path TO salon, public;")
            .await?;

        db.execute_unprepared("CREATE TYPE salon.role AS ENUM ('client', 'staff', 'admin')")
            .await?;
        db.execute_unprepared("CREATE TYPE salon.locale AS ENUM ('ar', 'en')")
            .await?;
        db.execute_unprepared(
            "CREATE TYPE salon.appointment_status AS ENUM (
                'pending',
                'confirmed',
                'completed',
                'cancelled'
            )",
        )
        .await?;

        let create_users_sql = r#"
            CREATE TABLE IF NOT EXISTS salon.users (
                id SERIAL PRIMARY KEY,
                full_name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                role salon.role NOT NULL DEFAULT 'client',
                locale salon.locale NOT NULL DEFAULT 'ar',
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_users_sql).await?;

        let create_services_sql = r#"
            CREATE TABLE IF NOT EXISTS salon.services (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                price NUMERIC(10, 2) NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_services_sql).await?;

        let create_appointments_sql = r#"
            CREATE TABLE IF NOT EXISTS salon.appointments (
                id SERIAL PRIMARY KEY,
                client_id INTEGER NOT NULL
                    REFERENCES salon.users(id) ON UPDATE CASCADE ON DELETE RESTRICT,
                staff_id INTEGER
                    REFERENCES salon.users(id) ON UPDATE CASCADE ON DELETE SET NULL,
                service_id INTEGER NOT NULL
                    REFERENCES salon.services(id) ON UPDATE CASCADE ON DELETE RESTRICT,
                date DATE NOT NULL,
                time TIME NOT NULL,
                status salon.appointment_status NOT NULL DEFAULT 'pending',
                price NUMERIC(10, 2) NOT NULL,
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_appointments_sql).await?;

        let create_notifications_sql = r#"
            CREATE TABLE IF NOT EXISTS salon.notifications (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL
                    REFERENCES salon.users(id) ON UPDATE CASCADE ON DELETE CASCADE,
                title VARCHAR(255) NOT NULL,
                message TEXT NOT NULL,
                is_read BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_notifications_sql).await?;

        let create_feedback_sql = r#"
            CREATE TABLE IF NOT EXISTS salon.feedback (
                id SERIAL PRIMARY KEY,
                appointment_id INTEGER NOT NULL UNIQUE
                    REFERENCES salon.appointments(id) ON UPDATE CASCADE ON DELETE CASCADE,
                client_id INTEGER NOT NULL REFERENCES salon.users(id),
                rating SMALLINT NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_feedback_sql).await?;

        // Newest-first listing and retention pruning both scan a user's notifications by age
        manager
            .create_index(
                Index::create()
                    .name("notifications_user_id_created_at")
                    .table((Alias::new("salon"), Alias::new("notifications")))
                    .col(Alias::new("user_id"))
                    .col((Alias::new("created_at"), IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("appointments_date")
                    .table((Alias::new("salon"), Alias::new("appointments")))
                    .col(Alias::new("date"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("appointments_client_id")
                    .table((Alias::new("salon"), Alias::new("appointments")))
                    .col(Alias::new("client_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CASCADE removes the tables, indexes and enum types with it
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS salon CASCADE;")
            .await?;

        Ok(())
    }
}
