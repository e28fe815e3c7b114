use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::category::{self, Entity as CategoryEntity};
use crate::error::StoreError;

pub static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9\-]{0,98}$").unwrap());

pub fn admin_category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/category", post(create_category).get(get_categories))
        .route(
            "/category/:id",
            get(get_category)
                .patch(patch_category)
                .delete(delete_category),
        )
        .layer(Extension(db))
}

async fn get_categories(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match CategoryEntity::find()
        .order_by_asc(category::Column::Name)
        .all(&*db)
        .await
    {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn get_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match CategoryEntity::find_by_id(id).one(&*db).await {
        Ok(Some(found)) => (StatusCode::OK, Json(found)).into_response(),
        Ok(None) => StoreError::NotFound(format!("No category with {} id was found", id))
            .into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateCategory>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return StoreError::Validation(err.to_string()).into_response();
    }

    let now = Utc::now();
    let new_category = category::ActiveModel {
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_category.insert(&*db).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(_) => {
            StoreError::Conflict("Category with this slug already exists".to_owned())
                .into_response()
        }
    }
}

//The slug is immutable after creation: the patch payload has no slug field.
async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCategory>,
) -> impl IntoResponse {
    let found = match CategoryEntity::find_by_id(id).one(&*db).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            return StoreError::NotFound(format!("No category with {} id was found", id))
                .into_response()
        }
        Err(err) => return StoreError::from(err).into_response(),
    };

    let mut active = found.into_active_model();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.updated_at = Set(Utc::now());

    match active.update(&*db).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let found = match CategoryEntity::find_by_id(id).one(&*db).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            return StoreError::NotFound(format!("No category with {} id was found", id))
                .into_response()
        }
        Err(err) => return StoreError::from(err).into_response(),
    };

    match found.into_active_model().delete(&*db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "message": "Resource deleted successfully"
            })),
        )
            .into_response(),
        //Products of this category that were already sold keep a Restrict
        //reference from their order items.
        Err(_) => StoreError::Conflict(
            "Cannot delete this category: its products appear in existing orders".to_owned(),
        )
        .into_response(),
    }
}

#[derive(Deserialize, Debug, Validate)]
struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(regex(path = *SLUG_REGEX, message = "Invalid slug"))]
    slug: String,
    #[validate(length(max = 5000))]
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PatchCategory {
    name: Option<String>,
    description: Option<String>,
}
