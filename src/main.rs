use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

use fashionstore::api::create_api_router;
use fashionstore::config::ConfigHandle;
use fashionstore::entities::{primary_setup, setup_schema};
use fashionstore::notifier::TelegramNotifier;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    std::env::var("SECRET").expect("SECRET must be set");

    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db).await.expect("Failed to create schema");
    primary_setup(&db).await.expect("Failed to seed the admin account");

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_owned());
    let config = ConfigHandle::load(config_path);
    config
        .reload(&db)
        .await
        .expect("Failed to load configuration");

    let shared_db = Arc::new(db);
    let notifier = Arc::new(TelegramNotifier::new());

    let bind = config.get().server.bind;
    let app = create_api_router(shared_db, config, notifier);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .expect("Failed to bind");
    tracing::info!(%bind, "Server running");
    axum::serve(listener, app).await.expect("Server failed");
}
