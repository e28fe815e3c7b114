use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info};

use crate::entities::{cart, cart_item};
use crate::error::StoreError;

/// Deletes carts (and their items) idle for at least `older_than_days`.
/// Returns how many carts were removed.
pub async fn cleanup_stale_carts(
    db: &DatabaseConnection,
    older_than_days: i64,
) -> Result<u64, StoreError> {
    let cutoff = Utc::now() - Duration::days(older_than_days);

    let stale: Vec<i32> = cart::Entity::find()
        .filter(cart::Column::UpdatedAt.lt(cutoff))
        .all(db)
        .await?
        .into_iter()
        .map(|cart| cart.id)
        .collect();
    if stale.is_empty() {
        return Ok(0);
    }

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.is_in(stale.clone()))
        .exec(db)
        .await?;
    let result = cart::Entity::delete_many()
        .filter(cart::Column::Id.is_in(stale))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Best-effort single-flight gate for the sweep: `try_claim` skips when
/// another request holds the lock or the interval has not elapsed. Not a real
/// lock, and it does not need to be; an occasional missed interval is fine.
#[derive(Clone, Debug, Default)]
pub struct SweepGuard {
    last_run: Arc<Mutex<Option<Instant>>>,
}

impl SweepGuard {
    pub fn new() -> Self {
        SweepGuard::default()
    }

    pub fn try_claim(&self, interval: std::time::Duration) -> bool {
        let Ok(mut last_run) = self.last_run.try_lock() else {
            return false;
        };
        match *last_run {
            Some(at) if at.elapsed() < interval => false,
            _ => {
                *last_run = Some(Instant::now());
                true
            }
        }
    }
}

/// Lazy-cron entry point called from the session middleware. The sweep runs
/// on a spawned task so no request ever blocks on it.
pub fn run_if_due(
    db: Arc<DatabaseConnection>,
    guard: &SweepGuard,
    cart_ttl_days: i64,
    interval: std::time::Duration,
) {
    if !guard.try_claim(interval) {
        return;
    }
    tokio::spawn(async move {
        match cleanup_stale_carts(&db, cart_ttl_days).await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "Removed stale carts"),
            Err(err) => error!(error = %err, "Stale cart sweep failed"),
        }
    });
}
