mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use std::path::PathBuf;

use fashionstore::config::ConfigHandle;
use fashionstore::entities::site_config;

fn temp_config_path() -> PathBuf {
    std::env::temp_dir().join(format!("fashionstore-config-{}.json", uuid::Uuid::new_v4()))
}

async fn put_db_section(db: &sea_orm::DatabaseConnection, section: &str, value: serde_json::Value) {
    let row = site_config::ActiveModel {
        section: Set(section.to_owned()),
        value: Set(value.to_string()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(db).await.expect("Failed to insert config row");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = ConfigHandle::load("/nonexistent/fashionstore/config.json");
    let snapshot = config.get();

    assert_eq!(snapshot.store.name, "Fashion Store");
    assert_eq!(snapshot.janitor.cart_ttl_days, 30);
    assert_eq!(snapshot.janitor.sweep_interval_secs, 3600);
}

#[test]
fn file_layer_overrides_defaults_section_by_section() {
    let path = temp_config_path();
    std::fs::write(
        &path,
        json!({
            "store": { "name": "File Store" },
            "janitor": { "cart_ttl_days": 7 }
        })
        .to_string(),
    )
    .unwrap();

    let config = ConfigHandle::load(&path);
    let snapshot = config.get();

    assert_eq!(snapshot.store.name, "File Store");
    //Untouched keys inside a touched section keep their defaults.
    assert_eq!(snapshot.store.title, "Fashion Store - Online Clothing Store");
    assert_eq!(snapshot.janitor.cart_ttl_days, 7);
    assert_eq!(snapshot.janitor.sweep_interval_secs, 3600);

    std::fs::remove_file(&path).ok();
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let path = temp_config_path();
    std::fs::write(&path, "{not json").unwrap();

    let config = ConfigHandle::load(&path);
    assert_eq!(config.get().store.name, "Fashion Store");

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn database_layer_overrides_the_file_layer() {
    let db = common::setup_db().await;
    let path = temp_config_path();
    std::fs::write(
        &path,
        json!({ "store": { "name": "File Store" } }).to_string(),
    )
    .unwrap();

    put_db_section(&db, "store", json!({ "name": "DB Store" })).await;

    let config = ConfigHandle::load(&path);
    assert_eq!(config.get().store.name, "File Store");

    let snapshot = config.reload(&db).await.unwrap();
    assert_eq!(snapshot.store.name, "DB Store");
    //Keys the database row does not carry still come from the file/defaults.
    assert_eq!(snapshot.store.title, "Fashion Store - Online Clothing Store");

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn reload_observes_database_changes() {
    let db = common::setup_db().await;
    let config = ConfigHandle::load("/nonexistent/fashionstore/config.json");

    config.reload(&db).await.unwrap();
    assert_eq!(config.get().janitor.cart_ttl_days, 30);

    put_db_section(&db, "janitor", json!({ "cart_ttl_days": 3 })).await;
    config.reload(&db).await.unwrap();
    assert_eq!(config.get().janitor.cart_ttl_days, 3);
}

#[tokio::test]
async fn malformed_database_rows_are_skipped() {
    let db = common::setup_db().await;

    let row = site_config::ActiveModel {
        section: Set("store".to_owned()),
        value: Set("{broken".to_owned()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(&db).await.unwrap();

    let config = ConfigHandle::load("/nonexistent/fashionstore/config.json");
    let snapshot = config.reload(&db).await.unwrap();
    assert_eq!(snapshot.store.name, "Fashion Store");
}
