// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use sqlx::SqlitePool;

use crate::{config::Config, error::AppError};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the Account ID (as string).
    pub sub: String,
    /// Account display name, for log lines.
    pub name: String,
    /// Token version of the account at signing time.
    pub ver: i64,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn account_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token".to_string()))
    }
}

/// Signs a new JWT for the account, valid for `expiration_seconds`.
pub fn sign_jwt(
    id: i64,
    name: &str,
    version: i64,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        name: name.to_owned(),
        ver: version,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header.
/// If valid, injects `Claims` into the request extensions for handlers to use.
/// If invalid, or issued before the account last logged out, returns a 401 JSON error.
pub async fn auth_middleware(
    State(config): State<Config>,
    State(pool): State<SqlitePool>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(AppError::AuthError("Not authenticated".to_string())),
    };

    let claims = verify_jwt(token, &config.jwt_secret)?;

    let current_version =
        sqlx::query_scalar::<_, i64>("SELECT token_version FROM accounts WHERE id = ?")
            .bind(claims.account_id()?)
            .fetch_optional(&pool)
            .await?;
    if current_version != Some(claims.ver) {
        return Err(AppError::AuthError(
            "Your session has ended. Please log in again.".to_string(),
        ));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
