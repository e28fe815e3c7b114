mod common;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::time::Duration as StdDuration;

use fashionstore::entities::{cart as cart_entity, cart_item};
use fashionstore::services::cart::{self, AddItem};
use fashionstore::services::janitor::{self, SweepGuard};

async fn backdate_cart(
    db: &sea_orm::DatabaseConnection,
    cart: &cart_entity::Model,
    days: i64,
) {
    let mut active: cart_entity::ActiveModel = cart.clone().into();
    active.updated_at = Set(Utc::now() - Duration::days(days));
    active.update(db).await.expect("Failed to backdate cart");
}

#[tokio::test]
async fn stale_carts_are_removed_and_fresh_ones_kept() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;

    let stale = cart::get_or_create_cart(&db, "stale-session").await.unwrap();
    let fresh = cart::get_or_create_cart(&db, "fresh-session").await.unwrap();
    for cart_model in [&stale, &fresh] {
        cart::add_item(
            &db,
            cart_model,
            AddItem {
                product_id: product.id,
                quantity: 1,
                size: String::new(),
                color: String::new(),
            },
        )
        .await
        .unwrap();
    }

    backdate_cart(&db, &stale, 40).await;
    backdate_cart(&db, &fresh, 5).await;

    let removed = janitor::cleanup_stale_carts(&db, 30).await.unwrap();
    assert_eq!(removed, 1);

    let remaining = cart_entity::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].session_key, "fresh-session");

    //The stale cart's items went with it.
    let items = cart_item::Entity::find().all(&db).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].cart_id, fresh.id);
}

#[tokio::test]
async fn cleanup_with_nothing_stale_is_a_noop() {
    let db = common::setup_db().await;
    let fresh = cart::get_or_create_cart(&db, "fresh-session").await.unwrap();
    backdate_cart(&db, &fresh, 5).await;

    let removed = janitor::cleanup_stale_carts(&db, 30).await.unwrap();
    assert_eq!(removed, 0);
    assert_eq!(cart_entity::Entity::find().all(&db).await.unwrap().len(), 1);
}

#[test]
fn sweep_guard_fires_at_most_once_per_interval() {
    let guard = SweepGuard::new();
    let hour = StdDuration::from_secs(3600);

    assert!(guard.try_claim(hour));
    //Second caller inside the interval is turned away.
    assert!(!guard.try_claim(hour));
    assert!(!guard.try_claim(hour));
}

#[test]
fn sweep_guard_reopens_after_the_interval_elapses() {
    let guard = SweepGuard::new();

    assert!(guard.try_claim(StdDuration::ZERO));
    //A zero interval is immediately due again.
    assert!(guard.try_claim(StdDuration::ZERO));
}
