use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;

use crate::entities::contact_message::{self, Entity as ContactMessageEntity};
use crate::error::StoreError;

pub fn admin_contact_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/message", get(get_messages))
        .layer(Extension(db))
}

async fn get_messages(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ContactMessageEntity::find()
        .order_by_desc(contact_message::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}
