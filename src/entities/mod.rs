pub mod cart;
pub mod cart_item;
pub mod category;
pub mod contact_message;
pub mod order;
pub mod order_item;
pub mod product;
pub mod site_config;
pub mod telegram_config;
pub mod user;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::sea_query::Index;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema, Set,
};

pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = vec![
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(product::Entity),
        schema.create_table_from_entity(cart::Entity),
        schema.create_table_from_entity(cart_item::Entity),
        schema.create_table_from_entity(order::Entity),
        schema.create_table_from_entity(order_item::Entity),
        schema.create_table_from_entity(contact_message::Entity),
        schema.create_table_from_entity(site_config::Entity),
        schema.create_table_from_entity(telegram_config::Entity),
        schema.create_table_from_entity(user::Entity),
    ];

    for stmt in tables.iter_mut() {
        stmt.if_not_exists();
        db.execute(backend.build(&*stmt)).await?;
    }

    //The merge-on-add contract: a concurrent duplicate insert must surface as
    //a database conflict rather than a second row.
    let cart_item_unique = Index::create()
        .name("idx_cart_item_cart_product_size_color")
        .table(cart_item::Entity)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .col(cart_item::Column::Size)
        .col(cart_item::Column::Color)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&cart_item_unique)).await?;

    Ok(())
}

/// Seeds the back-office admin account unless it already exists.
pub async fn primary_setup(db: &DatabaseConnection) -> Result<(), DbErr> {
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_owned());
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "change-me".to_owned());
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("Failed to hash admin password")
        .to_string();

    let new_admin = user::ActiveModel {
        username: Set(username),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        ..Default::default()
    };
    user::Entity::insert(new_admin).exec(db).await?;

    Ok(())
}
