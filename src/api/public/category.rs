use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;

use crate::entities::category::{self, Entity as CategoryEntity};
use crate::error::StoreError;

pub fn category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/category", get(get_categories))
        .route("/category/:slug", get(get_category))
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
        Ok(categories) => {
            let response: Vec<CategoryResponse> = categories
                .into_iter()
                .map(CategoryResponse::new)
                .collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn get_category(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match CategoryEntity::find()
        .filter(category::Column::Slug.eq(slug.clone()))
        .one(&*db)
        .await
    {
        Ok(Some(found)) => (StatusCode::OK, Json(CategoryResponse::new(found))).into_response(),
        Ok(None) => {
            StoreError::NotFound(format!("No category with slug '{}' was found", slug))
                .into_response()
        }
        Err(err) => StoreError::from(err).into_response(),
    }
}

#[derive(Serialize)]
struct CategoryResponse {
    id: i32,
    name: String,
    slug: String,
    description: String,
}

impl CategoryResponse {
    fn new(value: category::Model) -> CategoryResponse {
        CategoryResponse {
            id: value.id,
            name: value.name,
            slug: value.slug,
            description: value.description,
        }
    }
}
