use crate::entities::user::{self, Entity as UserEntity, Role};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => match header.strip_prefix("Bearer ") {
            Some(token) => token,
            None => return Err(StatusCode::UNAUTHORIZED),
        },
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let claims = match validate_token(state.db.clone(), token, state.role).await {
        Ok(claims) => claims,
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    /// Minimum role for the protected routes.
    pub role: Role,
}

pub fn generate_token(user_id: i32, role: String) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims { user_id, role, exp };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_secret_key()?.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub async fn validate_token(
    db: Arc<DatabaseConnection>,
    token: &str,
    required_role: Role,
) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_secret_key()?.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::TokenExpired)?;

    let claims = token_data.claims;
    let role = Role::from_str(&claims.role)
        .map_err(|_| AuthMiddlewareError::InvalidUserOrRole)?;

    //The token must still match a stored account with that role.
    match UserEntity::find_by_id(claims.user_id)
        .filter(user::Column::Role.eq(role))
        .one(&*db)
        .await
    {
        Ok(Some(_)) => {
            if role.meets(required_role) {
                Ok(claims)
            } else {
                Err(AuthMiddlewareError::InvalidUserOrRole)
            }
        }
        Ok(None) => Err(AuthMiddlewareError::InvalidUserOrRole),
        Err(_) => Err(AuthMiddlewareError::InternalServerError),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("SECRET is not configured")]
    MissingSecret,
    #[error("Internal server error")]
    InternalServerError,
}

fn get_secret_key() -> Result<String, AuthMiddlewareError> {
    std::env::var("SECRET").map_err(|_| AuthMiddlewareError::MissingSecret)
}
