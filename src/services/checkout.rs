use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::warn;

use crate::entities::order::{PaymentMethod, Status};
use crate::entities::{cart, cart_item, order, order_item, product};
use crate::error::StoreError;

#[derive(Clone, Debug)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub notes: String,
    pub payment_method: PaymentMethod,
}

/// Turns the session's cart into an immutable order.
///
/// Runs in one transaction: every referenced product is re-checked to still be
/// active (one missing product aborts the whole order), each item gets the
/// current `product.price` as its permanent snapshot, and the order total is
/// the sum over those snapshots rather than the live cart total. The cart is
/// cleared afterwards outside the transaction; a failed clear only logs.
pub async fn create_order(
    db: &DatabaseConnection,
    session_key: &str,
    info: CustomerInfo,
) -> Result<(order::Model, Vec<order_item::Model>), StoreError> {
    let cart = cart::Entity::find()
        .filter(cart::Column::SessionKey.eq(session_key))
        .one(db)
        .await?
        .ok_or_else(|| StoreError::InvalidArgument("Cart is empty".to_owned()))?;

    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .all(db)
        .await?;
    if items.is_empty() {
        return Err(StoreError::InvalidArgument("Cart is empty".to_owned()));
    }

    let txn = db.begin().await?;

    let mut snapshots = Vec::with_capacity(items.len());
    let mut total = 0f32;
    for item in &items {
        let product = match product::Entity::find_by_id(item.product_id)
            .filter(product::Column::IsActive.eq(true))
            .one(&txn)
            .await?
        {
            Some(product) => product,
            None => {
                let _ = txn.rollback().await;
                return Err(StoreError::NotFound(format!(
                    "Product {} is no longer available",
                    item.product_id
                )));
            }
        };
        total += product.price * item.quantity as f32;
        snapshots.push((item, product));
    }

    let now = Utc::now();
    let new_order = order::ActiveModel {
        session_key: Set(session_key.to_owned()),
        first_name: Set(info.first_name),
        last_name: Set(info.last_name),
        email: Set(info.email),
        phone: Set(info.phone),
        address: Set(info.address),
        city: Set(info.city),
        postal_code: Set(info.postal_code),
        notes: Set(info.notes),
        total: Set(total),
        status: Set(Status::Pending),
        payment_method: Set(info.payment_method),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let order = new_order.insert(&txn).await?;

    let mut created_items = Vec::with_capacity(snapshots.len());
    for (item, product) in snapshots {
        let new_item = order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(item.quantity),
            price: Set(product.price),
            size: Set(item.size.clone()),
            color: Set(item.color.clone()),
            ..Default::default()
        };
        created_items.push(new_item.insert(&txn).await?);
    }

    txn.commit().await?;

    //Best-effort cleanup. The order already stands.
    if let Err(err) = super::cart::clear(db, &cart).await {
        warn!(error = %err, cart_id = cart.id, "Failed to clear cart after checkout");
    }

    Ok((order, created_items))
}

/// Moves an order along `pending → processing → shipped → delivered`, with
/// `cancelled` reachable from any non-terminal state. Returns the updated
/// order together with the previous status so the caller can notify with
/// both.
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i32,
    new_status: Status,
) -> Result<(order::Model, Status), StoreError> {
    let existing = order::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("No order with {} id was found", order_id)))?;

    let old_status = existing.status;
    if !transition_allowed(old_status, new_status) {
        return Err(StoreError::InvalidArgument(format!(
            "Cannot move order from '{}' to '{}'",
            old_status, new_status
        )));
    }

    let mut active = existing.into_active_model();
    active.status = Set(new_status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    Ok((updated, old_status))
}

pub fn transition_allowed(from: Status, to: Status) -> bool {
    if from == to {
        return false;
    }
    match (from, to) {
        (Status::Pending, Status::Processing) => true,
        (Status::Processing, Status::Shipped) => true,
        (Status::Shipped, Status::Delivered) => true,
        (from, Status::Cancelled) => !from.is_terminal(),
        _ => false,
    }
}

pub async fn orders_for_session(
    db: &DatabaseConnection,
    session_key: &str,
) -> Result<Vec<order::Model>, StoreError> {
    Ok(order::Entity::find()
        .filter(order::Column::SessionKey.eq(session_key))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Fetches one order with its items. When `session_key` is given the order
/// must belong to that session; admins pass `None`.
pub async fn order_with_items(
    db: &DatabaseConnection,
    order_id: i32,
    session_key: Option<&str>,
) -> Result<(order::Model, Vec<order_item::Model>), StoreError> {
    let mut query = order::Entity::find_by_id(order_id);
    if let Some(session_key) = session_key {
        query = query.filter(order::Column::SessionKey.eq(session_key));
    }
    let order = query
        .one(db)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("No order with {} id was found", order_id)))?;

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(db)
        .await?;

    Ok((order, items))
}
