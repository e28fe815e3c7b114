use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use serde::Serialize;

use crate::entities::{cart, cart_item, product};
use crate::error::StoreError;

#[derive(Clone, Debug)]
pub struct AddItem {
    pub product_id: i32,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

/// One cart per session key, created lazily on the first interaction.
///
/// Two requests racing on the same fresh session collide on the unique
/// `session_key` index; the loser surfaces the conflict as a database error.
pub async fn get_or_create_cart(
    db: &DatabaseConnection,
    session_key: &str,
) -> Result<cart::Model, StoreError> {
    if let Some(existing) = cart::Entity::find()
        .filter(cart::Column::SessionKey.eq(session_key))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let new_cart = cart::ActiveModel {
        session_key: Set(session_key.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(new_cart.insert(db).await?)
}

/// Adds a line item, merging quantity into an existing row when the
/// (product, size, color) tuple is already in the cart.
pub async fn add_item(
    db: &DatabaseConnection,
    cart: &cart::Model,
    request: AddItem,
) -> Result<cart_item::Model, StoreError> {
    if request.quantity < 1 {
        return Err(StoreError::InvalidArgument(
            "Quantity should be greater than 0".to_owned(),
        ));
    }

    let product = product::Entity::find_by_id(request.product_id)
        .filter(product::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| {
            StoreError::NotFound(format!(
                "No active product with {} id was found",
                request.product_id
            ))
        })?;

    let existing = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product.id))
        .filter(cart_item::Column::Size.eq(request.size.clone()))
        .filter(cart_item::Column::Color.eq(request.color.clone()))
        .one(db)
        .await?;

    let item = match existing {
        Some(entry) => {
            let merged = entry.quantity + request.quantity;
            let mut entry = entry.into_active_model();
            entry.quantity = Set(merged);
            entry.updated_at = Set(Utc::now());
            entry.update(db).await?
        }
        None => {
            let now = Utc::now();
            let new_entry = cart_item::ActiveModel {
                cart_id: Set(cart.id),
                product_id: Set(product.id),
                quantity: Set(request.quantity),
                size: Set(request.size),
                color: Set(request.color),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            new_entry.insert(db).await?
        }
    };

    touch(db, cart).await?;
    Ok(item)
}

/// Overwrites the quantity of an item in this cart. No merge.
pub async fn update_item(
    db: &DatabaseConnection,
    cart: &cart::Model,
    item_id: i32,
    quantity: u32,
) -> Result<cart_item::Model, StoreError> {
    if quantity < 1 {
        return Err(StoreError::InvalidArgument(
            "Quantity should be greater than 0".to_owned(),
        ));
    }

    let entry = cart_item::Entity::find_by_id(item_id)
        .filter(cart_item::Column::CartId.eq(cart.id))
        .one(db)
        .await?
        .ok_or_else(|| {
            StoreError::NotFound(format!("No cart entry with {} id was found", item_id))
        })?;

    let mut entry = entry.into_active_model();
    entry.quantity = Set(quantity);
    entry.updated_at = Set(Utc::now());
    let updated = entry.update(db).await?;

    touch(db, cart).await?;
    Ok(updated)
}

/// Idempotent: removing an item that is already gone succeeds.
pub async fn remove_item(
    db: &DatabaseConnection,
    cart: &cart::Model,
    item_id: i32,
) -> Result<(), StoreError> {
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::Id.eq(item_id))
        .exec(db)
        .await?;

    touch(db, cart).await?;
    Ok(())
}

/// Idempotent: clearing an empty cart succeeds.
pub async fn clear(db: &DatabaseConnection, cart: &cart::Model) -> Result<(), StoreError> {
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .exec(db)
        .await?;

    touch(db, cart).await?;
    Ok(())
}

/// The cart total follows the live catalog price, so it moves when a product
/// is repriced after the item was added. Order totals are frozen instead.
pub async fn cart_total(db: &DatabaseConnection, cart: &cart::Model) -> Result<f32, StoreError> {
    Ok(cart_view(db, cart).await?.total)
}

pub async fn item_count(db: &DatabaseConnection, cart: &cart::Model) -> Result<u32, StoreError> {
    Ok(cart_view(db, cart).await?.items_count)
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: i32,
    pub session_key: String,
    pub items: Vec<CartItemView>,
    pub total: f32,
    pub items_count: u32,
}

#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub id: i32,
    pub product: ProductSummary,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub total: f32,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub price: f32,
    pub old_price: Option<f32>,
    pub discount_percent: u32,
}

impl ProductSummary {
    fn new(value: product::Model) -> ProductSummary {
        ProductSummary {
            id: value.id,
            name: value.name.clone(),
            slug: value.slug.clone(),
            price: value.price,
            old_price: value.old_price,
            discount_percent: value.discount_percent(),
        }
    }
}

pub async fn cart_view(
    db: &DatabaseConnection,
    cart: &cart::Model,
) -> Result<CartView, StoreError> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .find_also_related(product::Entity)
        .all(db)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    let mut total = 0f32;
    let mut items_count = 0u32;

    for (item, product) in rows {
        let product = product.ok_or_else(|| {
            StoreError::NotFound(format!("No product with {} id was found", item.product_id))
        })?;
        let line_total = product.price * item.quantity as f32;
        total += line_total;
        items_count += item.quantity;
        items.push(CartItemView {
            id: item.id,
            product: ProductSummary::new(product),
            quantity: item.quantity,
            size: item.size,
            color: item.color,
            total: line_total,
        });
    }

    Ok(CartView {
        id: cart.id,
        session_key: cart.session_key.clone(),
        items,
        total,
        items_count,
    })
}

async fn touch(db: &DatabaseConnection, cart: &cart::Model) -> Result<(), StoreError> {
    let mut active = cart.clone().into_active_model();
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    Ok(())
}
