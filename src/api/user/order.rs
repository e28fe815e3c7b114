use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::config::ConfigHandle;
use crate::entities::order::PaymentMethod;
use crate::entities::{order, order_item};
use crate::error::StoreError;
use crate::middleware::session::SessionKey;
use crate::notifier::TelegramNotifier;
use crate::services::checkout::{self, CustomerInfo};

use crate::api::public::contact::PHONE_REGEX;

pub fn order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_orders).post(create_order))
        .route("/order/:id", get(get_order))
        .layer(Extension(db))
}

async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
    Extension(config): Extension<ConfigHandle>,
    Extension(notifier): Extension<Arc<TelegramNotifier>>,
    Json(payload): Json<CreateOrderPayload>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return StoreError::Validation(err.to_string()).into_response();
    }

    let info = CustomerInfo {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        city: payload
            .city
            .unwrap_or_else(|| config.get().contact.address.city),
        postal_code: payload.postal_code.unwrap_or_default(),
        notes: payload.notes.unwrap_or_default(),
        payment_method: payload.payment_method,
    };

    let (order, items) = match checkout::create_order(&db, &session_key, info).await {
        Ok(created) => created,
        Err(err) => return err.into_response(),
    };

    //Side channel only; a failed send never rolls the order back.
    notifier.notify_new_order(&db, &order, &items).await;

    (
        StatusCode::CREATED,
        Json(OrderResponse::new(order, items)),
    )
        .into_response()
}

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
) -> impl IntoResponse {
    let orders = match checkout::orders_for_session(&db, &session_key).await {
        Ok(orders) => orders,
        Err(err) => return err.into_response(),
    };

    let mut response = Vec::with_capacity(orders.len());
    for order in orders {
        let items = match order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(&*db)
            .await
        {
            Ok(items) => items,
            Err(err) => return StoreError::from(err).into_response(),
        };
        response.push(OrderResponse::new(order, items));
    }

    (StatusCode::OK, Json(response)).into_response()
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(SessionKey(session_key)): Extension<SessionKey>,
) -> impl IntoResponse {
    match checkout::order_with_items(&db, id, Some(&session_key)).await {
        Ok((order, items)) => {
            (StatusCode::OK, Json(OrderResponse::new(order, items))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[derive(Deserialize, Debug, Validate)]
struct CreateOrderPayload {
    #[validate(length(min = 1, max = 100))]
    first_name: String,
    #[validate(length(min = 1, max = 100))]
    last_name: String,
    #[validate(email)]
    email: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    phone: String,
    #[validate(length(min = 1, max = 1000))]
    address: String,
    #[validate(length(min = 1, max = 100))]
    city: Option<String>,
    #[validate(length(max = 20))]
    postal_code: Option<String>,
    #[validate(length(max = 5000))]
    notes: Option<String>,
    payment_method: PaymentMethod,
}

#[derive(Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    order: order::Model,
    status_display: &'static str,
    payment_method_display: &'static str,
    items: Vec<order_item::Model>,
}

impl OrderResponse {
    pub fn new(order: order::Model, items: Vec<order_item::Model>) -> OrderResponse {
        let status_display = order.status.display();
        let payment_method_display = order.payment_method.display();
        OrderResponse {
            order,
            status_display,
            payment_method_display,
            items,
        }
    }
}
