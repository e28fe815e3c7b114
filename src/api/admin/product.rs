use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::category::SLUG_REGEX;
use crate::entities::category;
use crate::entities::product::{self, Entity as ProductEntity};
use crate::error::StoreError;

pub fn admin_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", post(create_product).get(get_products))
        .route(
            "/product/:id",
            get(get_product).patch(patch_product).delete(delete_product),
        )
        .layer(Extension(db))
}

//Admin listing includes inactive products.
async fn get_products(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ProductEntity::find()
        .order_by_desc(product::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ProductEntity::find_by_id(id).one(&*db).await {
        Ok(Some(found)) => (StatusCode::OK, Json(found)).into_response(),
        Ok(None) => {
            StoreError::NotFound(format!("No product with {} id was found", id)).into_response()
        }
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return StoreError::Validation(err.to_string()).into_response();
    }

    match category::Entity::find_by_id(payload.category_id).one(&*db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return StoreError::NotFound(format!(
                "No category with {} id was found",
                payload.category_id
            ))
            .into_response()
        }
        Err(err) => return StoreError::from(err).into_response(),
    }

    let now = Utc::now();
    let new_product = product::ActiveModel {
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description),
        price: Set(payload.price),
        old_price: Set(payload.old_price),
        category_id: Set(payload.category_id),
        available_sizes: Set(payload.available_sizes.unwrap_or_else(|| "M".to_owned())),
        available_colors: Set(payload.available_colors.unwrap_or_default()),
        stock: Set(payload.stock.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        rating: Set(payload.rating.unwrap_or(0.0)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_product.insert(&*db).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(_) => {
            StoreError::Conflict("Product with this slug already exists".to_owned())
                .into_response()
        }
    }
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return StoreError::Validation(err.to_string()).into_response();
    }

    let found = match ProductEntity::find_by_id(id).one(&*db).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            return StoreError::NotFound(format!("No product with {} id was found", id))
                .into_response()
        }
        Err(err) => return StoreError::from(err).into_response(),
    };

    if let Some(category_id) = payload.category_id {
        match category::Entity::find_by_id(category_id).one(&*db).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return StoreError::NotFound(format!(
                    "No category with {} id was found",
                    category_id
                ))
                .into_response()
            }
            Err(err) => return StoreError::from(err).into_response(),
        }
    }

    let mut active = found.into_active_model();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        active.slug = Set(slug);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if payload.old_price.is_some() {
        active.old_price = Set(payload.old_price);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(available_sizes) = payload.available_sizes {
        active.available_sizes = Set(available_sizes);
    }
    if let Some(available_colors) = payload.available_colors {
        active.available_colors = Set(available_colors);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    active.updated_at = Set(Utc::now());

    match active.update(&*db).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(_) => {
            StoreError::Conflict("Failed to patch this resource".to_owned()).into_response()
        }
    }
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let found = match ProductEntity::find_by_id(id).one(&*db).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            return StoreError::NotFound(format!("No product with {} id was found", id))
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
        //Sold products are pinned by the Restrict reference from order items;
        //disable them with is_active instead.
        Err(_) => StoreError::Conflict(
            "Cannot delete this product: it appears in existing orders".to_owned(),
        )
        .into_response(),
    }
}

#[derive(Deserialize, Clone, Debug, Validate)]
struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    name: String,
    #[validate(regex(path = *SLUG_REGEX, message = "Invalid slug"))]
    slug: String,
    #[validate(length(max = 10000))]
    description: String,
    #[validate(range(min = 0.0))]
    price: f32,
    #[validate(range(min = 0.0))]
    old_price: Option<f32>,
    category_id: i32,
    available_sizes: Option<String>,
    available_colors: Option<String>,
    stock: Option<u32>,
    is_active: Option<bool>,
    #[validate(range(min = 0.0, max = 5.0))]
    rating: Option<f32>,
}

#[derive(Deserialize, Debug, Validate)]
struct PatchProduct {
    #[validate(length(min = 1, max = 200))]
    name: Option<String>,
    #[validate(regex(path = *SLUG_REGEX, message = "Invalid slug"))]
    slug: Option<String>,
    #[validate(length(max = 10000))]
    description: Option<String>,
    #[validate(range(min = 0.0))]
    price: Option<f32>,
    #[validate(range(min = 0.0))]
    old_price: Option<f32>,
    category_id: Option<i32>,
    available_sizes: Option<String>,
    available_colors: Option<String>,
    stock: Option<u32>,
    is_active: Option<bool>,
    #[validate(range(min = 0.0, max = 5.0))]
    rating: Option<f32>,
}
