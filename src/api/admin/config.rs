use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ConfigHandle;
use crate::entities::{site_config, telegram_config};
use crate::error::StoreError;

const ALLOWED_SECTIONS: &[&str] = &["store", "contact", "social", "about", "janitor", "server"];

pub fn admin_config_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/config", get(get_config))
        .route("/config/reload", post(reload_config))
        .route(
            "/config/telegram",
            get(get_telegram_config).put(put_telegram_config),
        )
        .route("/config/:section", put(put_section))
        .layer(Extension(db))
}

async fn get_config(Extension(config): Extension<ConfigHandle>) -> impl IntoResponse {
    (StatusCode::OK, Json(config.get()))
}

/// Re-reads config.json and the site_config table on demand.
async fn reload_config(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<ConfigHandle>,
) -> impl IntoResponse {
    match config.reload(&db).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn put_section(
    Path(section): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<ConfigHandle>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    if !ALLOWED_SECTIONS.contains(&section.as_str()) {
        return StoreError::InvalidArgument(format!("Unknown config section '{}'", section))
            .into_response();
    }
    if !payload.is_object() {
        return StoreError::InvalidArgument(
            "Config section value must be a JSON object".to_owned(),
        )
        .into_response();
    }

    let serialized = payload.to_string();
    let existing = match site_config::Entity::find()
        .filter(site_config::Column::Section.eq(section.clone()))
        .one(&*db)
        .await
    {
        Ok(existing) => existing,
        Err(err) => return StoreError::from(err).into_response(),
    };

    let saved = match existing {
        Some(row) => {
            let mut active = row.into_active_model();
            active.value = Set(serialized);
            active.updated_at = Set(Utc::now());
            active.update(&*db).await
        }
        None => {
            let new_row = site_config::ActiveModel {
                section: Set(section),
                value: Set(serialized),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            new_row.insert(&*db).await
        }
    };
    if let Err(err) = saved {
        return StoreError::from(err).into_response();
    }

    //The stored row only matters through the merged snapshot.
    match config.reload(&db).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_telegram_config(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match telegram_config::Entity::find().one(&*db).await {
        Ok(row) => (StatusCode::OK, Json(row)).into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn put_telegram_config(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<TelegramConfigPayload>,
) -> impl IntoResponse {
    let existing = match telegram_config::Entity::find().one(&*db).await {
        Ok(existing) => existing,
        Err(err) => return StoreError::from(err).into_response(),
    };

    let saved = match existing {
        Some(row) => {
            let mut active = row.into_active_model();
            active.bot_token = Set(payload.bot_token);
            active.chat_id = Set(payload.chat_id);
            active.is_active = Set(payload.is_active);
            active.notify_new_orders = Set(payload.notify_new_orders.unwrap_or(true));
            active.notify_status_changes = Set(payload.notify_status_changes.unwrap_or(true));
            active.notify_contact_messages = Set(payload.notify_contact_messages.unwrap_or(true));
            active.updated_at = Set(Utc::now());
            active.update(&*db).await
        }
        None => {
            let new_row = telegram_config::ActiveModel {
                bot_token: Set(payload.bot_token),
                chat_id: Set(payload.chat_id),
                is_active: Set(payload.is_active),
                notify_new_orders: Set(payload.notify_new_orders.unwrap_or(true)),
                notify_status_changes: Set(payload.notify_status_changes.unwrap_or(true)),
                notify_contact_messages: Set(payload.notify_contact_messages.unwrap_or(true)),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            new_row.insert(&*db).await
        }
    };

    match saved {
        Ok(row) => (StatusCode::OK, Json(row)).into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}

#[derive(Deserialize, Debug)]
struct TelegramConfigPayload {
    bot_token: String,
    chat_id: String,
    is_active: bool,
    notify_new_orders: Option<bool>,
    notify_status_changes: Option<bool>,
    notify_contact_messages: Option<bool>,
}
