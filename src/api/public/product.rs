use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::entities::category;
use crate::entities::product::{self, Entity as ProductEntity};
use crate::error::StoreError;

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", get(get_products))
        .route("/product/popular", get(get_popular_products))
        .route("/product/:slug", get(get_product))
        .layer(Extension(db))
}

async fn get_products(
    Query(params): Query<GetProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let mut half_result = ProductEntity::find().filter(product::Column::IsActive.eq(true));

    if let Some(slug) = params.category {
        let found = match category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&*db)
            .await
        {
            Ok(found) => found,
            Err(err) => return StoreError::from(err).into_response(),
        };
        match found {
            Some(found) => {
                half_result = half_result.filter(product::Column::CategoryId.eq(found.id));
            }
            //Unknown category slug filters down to nothing.
            None => return (StatusCode::OK, Json(Vec::<ProductResponse>::new())).into_response(),
        }
    }

    if let Some(min) = params.min_price {
        half_result = half_result.filter(product::Column::Price.gte(min));
    }

    if let Some(max) = params.max_price {
        half_result = half_result.filter(product::Column::Price.lte(max));
    }

    if let Some(search) = params.search {
        half_result = half_result.filter(
            Condition::any()
                .add(product::Column::Name.contains(&search))
                .add(product::Column::Description.contains(&search)),
        );
    }

    match half_result
        .order_by_desc(product::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(products) => {
            let response: Vec<ProductResponse> =
                products.into_iter().map(ProductResponse::new).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn get_popular_products(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ProductEntity::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_desc(product::Column::Rating)
        .limit(8)
        .all(&*db)
        .await
    {
        Ok(products) => {
            let response: Vec<ProductResponse> =
                products.into_iter().map(ProductResponse::new).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn get_product(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ProductEntity::find()
        .filter(product::Column::Slug.eq(slug.clone()))
        .filter(product::Column::IsActive.eq(true))
        .one(&*db)
        .await
    {
        Ok(Some(found)) => (StatusCode::OK, Json(ProductResponse::new(found))).into_response(),
        Ok(None) => {
            StoreError::NotFound(format!("No product with slug '{}' was found", slug))
                .into_response()
        }
        Err(err) => StoreError::from(err).into_response(),
    }
}

#[derive(Deserialize)]
struct GetProductsQuery {
    category: Option<String>,
    min_price: Option<f32>,
    max_price: Option<f32>,
    search: Option<String>,
}

#[derive(Serialize)]
struct ProductResponse {
    id: i32,
    name: String,
    slug: String,
    description: String,
    price: f32,
    old_price: Option<f32>,
    discount_percent: u32,
    category_id: i32,
    available_sizes: String,
    available_colors: String,
    stock: u32,
    rating: f32,
}

impl ProductResponse {
    fn new(value: product::Model) -> ProductResponse {
        let discount_percent = value.discount_percent();
        ProductResponse {
            id: value.id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            price: value.price,
            old_price: value.old_price,
            discount_percent,
            category_id: value.category_id,
            available_sizes: value.available_sizes,
            available_colors: value.available_colors,
            stock: value.stock,
            rating: value.rating,
        }
    }
}
