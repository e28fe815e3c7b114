use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::user::order::OrderResponse;
use crate::entities::order::{self, Entity as OrderEntity, Status};
use crate::error::StoreError;
use crate::notifier::TelegramNotifier;
use crate::services::checkout;

pub fn admin_order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_orders))
        .route("/order/:id", get(get_order))
        .route("/order/:id/status", patch(patch_status))
        .layer(Extension(db))
}

async fn get_orders(
    Query(params): Query<GetOrdersQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let mut half_result = OrderEntity::find();
    if let Some(raw) = params.status {
        let status = match Status::from_str(&raw) {
            Ok(status) => status,
            Err(err) => return StoreError::InvalidArgument(err).into_response(),
        };
        half_result = half_result.filter(order::Column::Status.eq(status));
    }

    match half_result
        .order_by_desc(order::Column::CreatedAt)
        .all(&*db)
        .await
    {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(err) => StoreError::from(err).into_response(),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match checkout::order_with_items(&db, id, None).await {
        Ok((order, items)) => {
            (StatusCode::OK, Json(OrderResponse::new(order, items))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

async fn patch_status(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(notifier): Extension<Arc<TelegramNotifier>>,
    Json(payload): Json<PatchStatus>,
) -> impl IntoResponse {
    let (updated, old_status) = match checkout::update_status(&db, id, payload.status).await {
        Ok(updated) => updated,
        Err(err) => return err.into_response(),
    };

    //Explicit side-channel call with both statuses; no observer indirection.
    notifier.notify_status_change(&db, &updated, old_status).await;

    (StatusCode::OK, Json(updated)).into_response()
}

#[derive(Deserialize)]
struct GetOrdersQuery {
    status: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PatchStatus {
    status: Status,
}
