use events::EventPublisher;
use domain::notification::NotificationDispatcher;
use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting up salon booking API server...");
    info!(
        "Salon timezone: {}, notification retention: {} per user",
        config.salon_timezone, config.notification_retention_limit
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let event_publisher = EventPublisher::new().with_handler(Arc::new(
        NotificationDispatcher::new(&db, config.notification_retention_limit),
    ));
    debug!(
        "Event publisher ready with {} handler(s)",
        event_publisher.handler_count()
    );

    let app_state = web::AppState::new(service::AppState::new(config, &db), event_publisher);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
