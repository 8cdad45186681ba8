use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum_login::{
    tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use domain::events::EventPublisher;
use domain::user::Backend;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod protect;
pub mod router;

pub use error::{Error, Result};

/// Session key holding the anti-forgery token issued at login.
pub(crate) const CSRF_TOKEN_KEY: &str = "csrf_token";
/// Header a script client may send the token in instead of the form field.
pub(crate) const CSRF_HEADER: &str = "x-csrf-token";

const SESSION_TABLE: &str = "authorized_sessions";

// Per-request state for the web layer: the infrastructure from `service` plus
// the publisher every booking mutation reports to.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    pub fn new(service_state: service::AppState, event_publisher: EventPublisher) -> Self {
        Self {
            service_state,
            event_publisher: Arc::new(event_publisher),
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = app_state.config().clone();

    // Sessions live next to the salon tables so one backup covers both.
    let pool = app_state
        .db_conn_ref()
        .get_postgres_connection_pool()
        .clone();
    let session_store = PostgresStore::new(pool)
        .with_schema_name("salon")?
        .with_table_name(SESSION_TABLE)?;
    session_store.migrate().await?;

    let expired_sessions = session_store.clone();
    tokio::task::spawn(async move {
        if let Err(e) = expired_sessions
            .continuously_delete_expired(tokio::time::Duration::from_secs(60))
            .await
        {
            error!("Expired session cleanup stopped: {e:?}");
        }
    });

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.backend_session_expiry_seconds as i64,
        )));

    let backend = Backend::new(&app_state.service_state.database_connection);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let allowed_origins = config
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    info!("CORS allowed origins: {allowed_origins:?}");

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static(CSRF_HEADER)])
        .allow_origin(allowed_origins);

    let interface = config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{interface}:{}", config.port);
    let listener = TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    let router = router::define_routes(app_state)
        .layer(auth_layer)
        .layer(cors_layer);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
pub(crate) mod test_support;
