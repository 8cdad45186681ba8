pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_salon_schema;
mod m20250101_000002_add_initial_admin;
mod m20250101_000003_create_announcements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_salon_schema::Migration),
            Box::new(m20250101_000002_add_initial_admin::Migration),
            Box::new(m20250101_000003_create_announcements::Migration),
        ]
    }
}
