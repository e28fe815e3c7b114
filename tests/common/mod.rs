#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use fashionstore::entities::{category, product, setup_schema};

/// Fresh in-memory database with the full schema. A single pooled connection
/// keeps every query on the same sqlite memory instance.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");
    db
}

pub async fn seed_category(db: &DatabaseConnection, name: &str, slug: &str) -> category::Model {
    let now = Utc::now();
    let new_category = category::ActiveModel {
        name: Set(name.to_owned()),
        slug: Set(slug.to_owned()),
        description: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_category
        .insert(db)
        .await
        .expect("Failed to seed category")
}

pub async fn seed_product(
    db: &DatabaseConnection,
    category_id: i32,
    name: &str,
    slug: &str,
    price: f32,
    is_active: bool,
) -> product::Model {
    let now = Utc::now();
    let new_product = product::ActiveModel {
        name: Set(name.to_owned()),
        slug: Set(slug.to_owned()),
        description: Set(format!("{} description", name)),
        price: Set(price),
        old_price: Set(None),
        category_id: Set(category_id),
        available_sizes: Set("M".to_owned()),
        available_colors: Set("Black, White".to_owned()),
        stock: Set(10),
        is_active: Set(is_active),
        rating: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_product
        .insert(db)
        .await
        .expect("Failed to seed product")
}

pub async fn reprice_product(db: &DatabaseConnection, product: &product::Model, price: f32) {
    let mut active: product::ActiveModel = product.clone().into();
    active.price = Set(price);
    active.updated_at = Set(Utc::now());
    active.update(db).await.expect("Failed to reprice product");
}

pub async fn deactivate_product(db: &DatabaseConnection, product: &product::Model) {
    let mut active: product::ActiveModel = product.clone().into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now());
    active.update(db).await.expect("Failed to deactivate product");
}
