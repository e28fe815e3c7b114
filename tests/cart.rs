mod common;

use fashionstore::error::StoreError;
use fashionstore::services::cart::{self, AddItem};

fn add_request(product_id: i32, quantity: u32, size: &str, color: &str) -> AddItem {
    AddItem {
        product_id,
        quantity,
        size: size.to_owned(),
        color: color.to_owned(),
    }
}

#[tokio::test]
async fn adding_same_tuple_twice_merges_quantity() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(product.id, 2, "M", "black"))
        .await
        .unwrap();
    let merged = cart::add_item(&db, &cart, add_request(product.id, 3, "M", "black"))
        .await
        .unwrap();

    assert_eq!(merged.quantity, 5);

    let view = cart::cart_view(&db, &cart).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items_count, 5);
}

#[tokio::test]
async fn differing_size_or_color_creates_separate_rows() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(product.id, 1, "M", "black"))
        .await
        .unwrap();
    cart::add_item(&db, &cart, add_request(product.id, 1, "L", "black"))
        .await
        .unwrap();
    cart::add_item(&db, &cart, add_request(product.id, 1, "M", "white"))
        .await
        .unwrap();

    let view = cart::cart_view(&db, &cart).await.unwrap();
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.items_count, 3);
}

#[tokio::test]
async fn one_cart_per_session_key() {
    let db = common::setup_db().await;

    let first = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    let again = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    let other = cart::get_or_create_cart(&db, "session-b").await.unwrap();

    assert_eq!(first.id, again.id);
    assert_ne!(first.id, other.id);
}

#[tokio::test]
async fn add_rejects_zero_quantity() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    let err = cart::add_item(&db, &cart, add_request(product.id, 0, "", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidArgument(_)));
}

#[tokio::test]
async fn add_rejects_missing_or_inactive_product() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let inactive =
        common::seed_product(&db, category.id, "Old Shirt", "old-shirt", 10.0, false).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();

    let err = cart::add_item(&db, &cart, add_request(9999, 1, "", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = cart::add_item(&db, &cart, add_request(inactive.id, 1, "", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn update_overwrites_quantity_without_merging() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    let item = cart::add_item(&db, &cart, add_request(product.id, 2, "M", "black"))
        .await
        .unwrap();

    let updated = cart::update_item(&db, &cart, item.id, 7).await.unwrap();
    assert_eq!(updated.quantity, 7);

    let err = cart::update_item(&db, &cart, item.id, 0).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    let err = cart::update_item(&db, &cart, 9999, 1).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn update_cannot_touch_items_of_another_cart() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart_a = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    let cart_b = cart::get_or_create_cart(&db, "session-b").await.unwrap();
    let item = cart::add_item(&db, &cart_a, add_request(product.id, 2, "", ""))
        .await
        .unwrap();

    let err = cart::update_item(&db, &cart_b, item.id, 5).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn remove_and_clear_are_idempotent() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    let item = cart::add_item(&db, &cart, add_request(product.id, 2, "", ""))
        .await
        .unwrap();

    cart::remove_item(&db, &cart, item.id).await.unwrap();
    //Removing a row that is already gone still succeeds.
    cart::remove_item(&db, &cart, item.id).await.unwrap();

    cart::clear(&db, &cart).await.unwrap();
    cart::clear(&db, &cart).await.unwrap();

    let view = cart::cart_view(&db, &cart).await.unwrap();
    assert!(view.items.is_empty());
}

#[tokio::test]
async fn cart_total_follows_live_product_price() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(&db, &cart, add_request(product.id, 2, "", ""))
        .await
        .unwrap();
    assert_eq!(cart::cart_total(&db, &cart).await.unwrap(), 20.0);

    common::reprice_product(&db, &product, 15.0).await;
    assert_eq!(cart::cart_total(&db, &cart).await.unwrap(), 30.0);
}
