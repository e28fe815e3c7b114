use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde_json::json;

use crate::config::ConfigHandle;

pub fn config_router() -> Router {
    Router::new().route("/config", get(get_config))
}

//Storefront sections only; janitor and server knobs stay internal.
async fn get_config(Extension(config): Extension<ConfigHandle>) -> impl IntoResponse {
    let snapshot = config.get();
    (
        StatusCode::OK,
        Json(json!({
            "store": snapshot.store,
            "contact": snapshot.contact,
            "social": snapshot.social,
            "about": snapshot.about,
        })),
    )
}
