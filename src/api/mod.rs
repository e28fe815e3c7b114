pub mod admin;
pub mod public;
pub mod user;

use axum::{middleware::from_fn, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

use crate::config::ConfigHandle;
use crate::middleware::logging::logging_middleware;
use crate::middleware::session::session_middleware;
use crate::notifier::TelegramNotifier;
use crate::services::janitor::SweepGuard;

pub fn create_api_router(
    shared_db: Arc<DatabaseConnection>,
    config: ConfigHandle,
    notifier: Arc<TelegramNotifier>,
) -> Router {
    let guard = SweepGuard::new();

    Router::new()
        .nest("/api", public_api_router(shared_db.clone()))
        .nest("/api", user_api_router(shared_db.clone()))
        .nest("/api/admin", admin_api_router(shared_db.clone()))
        .layer(from_fn(session_middleware))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(shared_db))
        .layer(Extension(config))
        .layer(Extension(notifier))
        .layer(Extension(guard))
}
