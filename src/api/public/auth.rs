use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::user::{self, Entity as UserEntity};
use crate::middleware::auth::generate_token;

pub fn auth_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/login", post(login))
        .layer(Extension(db))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<LoginPayload>,
) -> impl IntoResponse {
    match UserEntity::find()
        .filter(user::Column::Username.eq(payload.username.clone()))
        .one(&*db)
        .await
    {
        Ok(Some(found)) => match found.check_hash(&payload.password) {
            Ok(()) => match generate_token(found.id, found.role.as_str().to_owned()) {
                Ok(token) => (
                    StatusCode::OK,
                    Json(json!({
                        "token": token
                    })),
                ),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
            },
            Err(_) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Invalid username or password"
                })),
            ),
        },
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid username or password"
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

#[derive(Deserialize, Debug)]
struct LoginPayload {
    username: String,
    password: String,
}
