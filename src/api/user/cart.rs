use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::session::SessionKey;
use crate::services::cart::{self, AddItem};

pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/:id", patch(patch_item).delete(remove_item))
        .layer(Extension(db))
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
) -> impl IntoResponse {
    let cart = match cart::get_or_create_cart(&db, &session_key).await {
        Ok(cart) => cart,
        Err(err) => return err.into_response(),
    };
    match cart::cart_view(&db, &cart).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn add_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
    Json(payload): Json<AddItemPayload>,
) -> impl IntoResponse {
    let cart = match cart::get_or_create_cart(&db, &session_key).await {
        Ok(cart) => cart,
        Err(err) => return err.into_response(),
    };

    let request = AddItem {
        product_id: payload.product_id,
        quantity: payload.quantity.unwrap_or(1),
        size: payload.size.unwrap_or_default(),
        color: payload.color.unwrap_or_default(),
    };
    match cart::add_item(&db, &cart, request).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn patch_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
    Json(payload): Json<PatchItemPayload>,
) -> impl IntoResponse {
    let cart = match cart::get_or_create_cart(&db, &session_key).await {
        Ok(cart) => cart,
        Err(err) => return err.into_response(),
    };
    match cart::update_item(&db, &cart, id, payload.quantity).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn remove_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
) -> impl IntoResponse {
    let cart = match cart::get_or_create_cart(&db, &session_key).await {
        Ok(cart) => cart,
        Err(err) => return err.into_response(),
    };
    match cart::remove_item(&db, &cart, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn clear_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
) -> impl IntoResponse {
    let cart = match cart::get_or_create_cart(&db, &session_key).await {
        Ok(cart) => cart,
        Err(err) => return err.into_response(),
    };
    match cart::clear(&db, &cart).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Deserialize, Debug)]
struct AddItemPayload {
    product_id: i32,
    quantity: Option<u32>,
    size: Option<String>,
    color: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PatchItemPayload {
    quantity: u32,
}
