pub mod cart;
pub mod order;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use cart::cart_router;
use order::order_router;

pub fn user_api_router(db: Arc<DatabaseConnection>) -> Router {
    let cart_router = cart_router(db.clone());
    let order_router = order_router(db.clone());

    Router::new()
        .nest("/", cart_router)
        .nest("/", order_router)
}
