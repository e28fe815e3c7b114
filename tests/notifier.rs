mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use fashionstore::entities::order::{PaymentMethod, Status};
use fashionstore::entities::{order, telegram_config};
use fashionstore::notifier::TelegramNotifier;
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
        postal_code: String::new(),
        notes: String::new(),
        payment_method: PaymentMethod::Cash,
    }
}

async fn insert_telegram_config(db: &sea_orm::DatabaseConnection, is_active: bool, token: &str) {
    let row = telegram_config::ActiveModel {
        bot_token: Set(token.to_owned()),
        chat_id: Set("-100200300".to_owned()),
        is_active: Set(is_active),
        notify_new_orders: Set(true),
        notify_status_changes: Set(true),
        notify_contact_messages: Set(true),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(db).await.expect("Failed to insert telegram config");
}

fn sample_order() -> order::Model {
    let now = Utc::now();
    order::Model {
        id: 1,
        session_key: "session-a".to_owned(),
        first_name: "Alice".to_owned(),
        last_name: "Smith".to_owned(),
        email: "alice@example.com".to_owned(),
        phone: "+7 900 000 00 00".to_owned(),
        address: "Example Street, 1".to_owned(),
        city: "Tashkent".to_owned(),
        postal_code: String::new(),
        notes: String::new(),
        total: 20.0,
        status: Status::Pending,
        payment_method: PaymentMethod::Cash,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn missing_configuration_disables_sends() {
    let db = common::setup_db().await;
    let notifier = TelegramNotifier::with_api_base("http://127.0.0.1:9");

    assert!(!notifier.notify_new_order(&db, &sample_order(), &[]).await);
    assert!(
        !notifier
            .notify_status_change(&db, &sample_order(), Status::Pending)
            .await
    );
}

#[tokio::test]
async fn inactive_or_blank_configuration_disables_sends() {
    let db = common::setup_db().await;
    insert_telegram_config(&db, false, "123:token").await;

    let notifier = TelegramNotifier::with_api_base("http://127.0.0.1:9");
    assert!(!notifier.notify_new_order(&db, &sample_order(), &[]).await);

    telegram_config::Entity::delete_many().exec(&db).await.unwrap();
    insert_telegram_config(&db, true, "").await;
    assert!(!notifier.notify_new_order(&db, &sample_order(), &[]).await);
}

#[tokio::test]
async fn unreachable_endpoint_reports_false_but_never_errors() {
    let db = common::setup_db().await;
    insert_telegram_config(&db, true, "123:token").await;

    //Nothing listens on this port; the send fails fast and is swallowed.
    let notifier = TelegramNotifier::with_api_base("http://127.0.0.1:9");
    assert!(!notifier.notify_new_order(&db, &sample_order(), &[]).await);
}

#[tokio::test]
async fn notifier_failure_does_not_prevent_order_creation() {
    let db = common::setup_db().await;
    let category = common::seed_category(&db, "Shirts", "shirts").await;
    let product = common::seed_product(&db, category.id, "Shirt", "shirt", 10.0, true).await;
    insert_telegram_config(&db, true, "123:broken-token").await;

    let cart = cart::get_or_create_cart(&db, "session-a").await.unwrap();
    cart::add_item(
        &db,
        &cart,
        AddItem {
            product_id: product.id,
            quantity: 2,
            size: "M".to_owned(),
            color: "black".to_owned(),
        },
    )
    .await
    .unwrap();

    let (created, items) = checkout::create_order(&db, "session-a", customer())
        .await
        .unwrap();

    //The handler fires this after checkout; the failed send changes nothing.
    let notifier = TelegramNotifier::with_api_base("http://127.0.0.1:9");
    let delivered = notifier.notify_new_order(&db, &created, &items).await;
    assert!(!delivered);

    let stored = order::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, 20.0);
    assert_eq!(stored.status, Status::Pending);
}
