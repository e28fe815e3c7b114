use axum::{
    extract::{Extension, Request},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ConfigHandle;
use crate::services::janitor::{self, SweepGuard};

pub const SESSION_COOKIE: &str = "cart_session";

/// The request's session key, set for every route below this middleware.
#[derive(Clone, Debug)]
pub struct SessionKey(pub String);

/// Issues a session key cookie when the client has none, and piggybacks the
/// stale-cart sweep on request traffic (rate-limited by the guard).
pub async fn session_middleware(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<ConfigHandle>,
    Extension(guard): Extension<SweepGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = req
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_session_cookie);

    let (session_key, is_new) = match existing {
        Some(key) => (key, false),
        None => (Uuid::new_v4().simple().to_string(), true),
    };
    req.extensions_mut().insert(SessionKey(session_key.clone()));

    let janitor_config = config.get().janitor;
    janitor::run_if_due(
        db.clone(),
        &guard,
        janitor_config.cart_ttl_days,
        std::time::Duration::from_secs(janitor_config.sweep_interval_secs),
    );

    let mut response = next.run(req).await;

    if is_new {
        let cookie = format!(
            "{}={}; Path=/; Max-Age=2592000; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session_key
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

fn parse_session_cookie(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE)?
                .strip_prefix('=')
                .map(|value| value.trim().to_owned())
        })
        .filter(|value| !value.is_empty())
}
