mod common;

use sea_orm::EntityTrait;

use fashionstore::entities::order::{PaymentMethod, Status};
use fashionstore::entities::{order, order_item};
use fashionstore::error::StoreError;
use fashionstore::services::cart::{self, AddItem};
use fashionstore::services::checkout::{self, CustomerInfo};

fn customer() -> CustomerInfo {
    CustomerInfo {
        first_name: "Alice".to_owned(),
        last_name: "Smith".to_owned(),
        email: "alice@example.com".to_owned(),
        phone: "+7 900 000 00 00".to_owned(),
        address: "Example Street, 1".to_owned(),
        city: "Tashkent".to_owned(),
        postal_code: "100000".to_owned(),
        notes: String::new(),
        payment_method: PaymentMethod::Card,
    }
}

fn add_request(product_id: i32, quantity: u32) -> AddItem {
    AddItem {
        product_id,
        quantity,
        size: "M".to_owned(),
        color: "black".to_owned(),
    }
}

#[tokio::test]
async fn checkout_on_empty_cart_fails_and_creates_nothing() {
    let db = common::setup_db().await;
    cart::get_or_create_cart(&db, "session-a").await.unwrap();

    let err = checkout::create_order(&db, "session-a", customer())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    //Same failure for a session that never opened a cart.
    let err = checkout::create_order(&db, "session-z", customer())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    assert!(order::Entity::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn order_total_is_frozen_against_later_price_changes() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let shirt = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;
    let coat = common::seed_product(&db, category.id, "Coat", "coat", 25.5, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(shirt.id, 2)).await.unwrap();
    cart::add_item(&db, &cart, add_request(coat.id, 1)).await.unwrap();

    let (order, items) = checkout::create_order(&db, "session-a", customer())
        .await
        .unwrap();

    assert_eq!(order.status, Status::Pending);
    assert_eq!(order.total, 45.5);
    assert_eq!(items.len(), 2);

    let snapshot_sum: f32 = items
        .iter()
        .map(|item| item.price * item.quantity as f32)
        .sum();
    assert_eq!(order.total, snapshot_sum);

    //Catalog changes after checkout must not move the frozen numbers.
    common::reprice_product(&db, &shirt, 99.0).await;

    let stored = order::Entity::find_by_id(order.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, 45.5);

    let stored_items = order_item::Entity::find().all(&db).await.unwrap();
    let shirt_item = stored_items
        .iter()
        .find(|item| item.product_id == shirt.id)
        .unwrap();
    assert_eq!(shirt_item.price, 10.0);
}

#[tokio::test]
async fn checkout_with_deactivated_product_aborts_atomically() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let shirt = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;
    let coat = common::seed_product(&db, category.id, "Coat", "coat", 25.5, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(shirt.id, 1)).await.unwrap();
    cart::add_item(&db, &cart, add_request(coat.id, 1)).await.unwrap();

    common::deactivate_product(&db, &coat).await;

    let err = checkout::create_order(&db, "session-a", customer())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    //Nothing persists, and the cart keeps its items.
    assert!(order::Entity::find().all(&db).await.unwrap().is_empty());
    assert!(order_item::Entity::find().all(&db).await.unwrap().is_empty());
    assert_eq!(cart::item_count(&db, &cart).await.unwrap(), 2);
}

#[tokio::test]
async fn successful_checkout_clears_the_cart() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let shirt = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(shirt.id, 3)).await.unwrap();

    checkout::create_order(&db, "session-a", customer())
        .await
        .unwrap();

    assert_eq!(cart::item_count(&db, &cart).await.unwrap(), 0);
}

#[tokio::test]
async fn status_machine_allows_forward_steps_and_cancellation() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let shirt = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(shirt.id, 1)).await.unwrap();
    let (order, _) = checkout::create_order(&db, "session-a", customer())
        .await
        .unwrap();

    //Skipping a step is rejected.
    let err = checkout::update_status(&db, order.id, Status::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    let (updated, old) = checkout::update_status(&db, order.id, Status::Processing)
        .await
        .unwrap();
    assert_eq!(old, Status::Pending);
    assert_eq!(updated.status, Status::Processing);

    let (updated, _) = checkout::update_status(&db, order.id, Status::Shipped)
        .await
        .unwrap();
    assert_eq!(updated.status, Status::Shipped);

    let (updated, _) = checkout::update_status(&db, order.id, Status::Delivered)
        .await
        .unwrap();
    assert_eq!(updated.status, Status::Delivered);

    //Delivered is terminal, even for cancellation.
    let err = checkout::update_status(&db, order.id, Status::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
}

#[tokio::test]
async fn cancellation_is_reachable_from_any_non_terminal_state() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let shirt = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(shirt.id, 1)).await.unwrap();
    let (order, _) = checkout::create_order(&db, "session-a", customer())
        .await
        .unwrap();

    let (updated, _) = checkout::update_status(&db, order.id, Status::Cancelled)
        .await
        .unwrap();
    assert_eq!(updated.status, Status::Cancelled);

    //And nothing leaves cancelled.
    let err = checkout::update_status(&db, order.id, Status::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
}

#[tokio::test]
async fn update_status_on_missing_order_is_not_found() {
    let db = common::setup_db().await;
    let err = checkout::update_status(&db, 42, Status::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
