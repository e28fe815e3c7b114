pub mod category;
pub mod config;
pub mod contact;
pub mod order;
pub mod product;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use category::admin_category_router;
use config::admin_config_router;
use contact::admin_contact_router;
use order::admin_order_router;
use product::admin_product_router;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};

pub fn admin_api_router(db: Arc<DatabaseConnection>) -> Router {
    let admin_category_router = admin_category_router(db.clone());
    let admin_product_router = admin_product_router(db.clone());
    let admin_order_router = admin_order_router(db.clone());
    let admin_contact_router = admin_contact_router(db.clone());
    let admin_config_router = admin_config_router(db.clone());

    Router::new()
        .nest("/", admin_category_router)
        .nest("/", admin_product_router)
        .nest("/", admin_order_router)
        .nest("/", admin_contact_router)
        .nest("/", admin_config_router)
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                role: Role::Staff,
            },
            auth_middleware,
        ))
}
