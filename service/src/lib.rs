use config::Config;
use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tokio::time::Duration;

pub mod config;
pub mod logging;

/// Postgres schema holding every salon table. Unqualified names resolve here first.
pub const DB_SCHEMA: &str = "salon";

/// Pool settings and search path for `config`, without connecting.
pub fn connect_options(config: &Config) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.database_url());
    options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(config.db_connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info)
        .set_schema_search_path(DB_SCHEMA);
    options
}

pub async fn init_database(config: &Config) -> Result<DatabaseConnection, DbErr> {
    info!(
        "Connecting to schema {DB_SCHEMA} with {}..{} pooled connections \
         (connect {}s, acquire {}s, idle {}s, lifetime {}s)",
        config.db_min_connections,
        config.db_max_connections,
        config.db_connect_timeout_secs,
        config.db_acquire_timeout_secs,
        config.db_idle_timeout_secs,
        config.db_max_lifetime_secs,
    );

    Database::connect(connect_options(config)).await
}

/// Connection and configuration handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, db: &Arc<DatabaseConnection>) -> Self {
        Self {
            database_connection: Arc::clone(db),
            config: app_config,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }
}
