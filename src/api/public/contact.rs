use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::contact_message;
use crate::error::StoreError;
use crate::notifier::TelegramNotifier;

pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").unwrap());

pub fn contact_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/contact", post(submit_contact))
        .layer(Extension(db))
}

async fn submit_contact(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(notifier): Extension<Arc<TelegramNotifier>>,
    Json(payload): Json<ContactPayload>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return StoreError::Validation(err.to_string()).into_response();
    }

    let new_message = contact_message::ActiveModel {
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone.unwrap_or_default()),
        subject: Set(payload.subject),
        message: Set(payload.message),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let saved = match new_message.insert(&*db).await {
        Ok(saved) => saved,
        Err(err) => return StoreError::from(err).into_response(),
    };

    //Side channel only; its outcome never changes the response.
    notifier.notify_contact_message(&db, &saved).await;

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Message sent successfully",
            "id": saved.id
        })),
    )
        .into_response()
}

#[derive(Deserialize, Debug, Validate)]
struct ContactPayload {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    subject: String,
    #[validate(length(min = 1, max = 5000))]
    message: String,
}
