// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, conflict_or_internal},
    models::account::{Account, Authenticatable, LoginRequest, RegisterRequest},
    quiz::session::QuizSessionStore,
    utils::{hash::hash_password, jwt::{Claims, sign_jwt}},
};

/// Registers a new account.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the account object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let payload = payload.trimmed();
    payload.validate()?;

    // Checked up front for a precise message; the UNIQUE constraints still guard races.
    let name_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM accounts WHERE name = ?")
        .bind(&payload.name)
        .fetch_optional(&pool)
        .await?;
    if name_taken.is_some() {
        return Err(AppError::Conflict(
            "An account with this name already exists.".to_string(),
        ));
    }

    let email_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM accounts WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::Conflict(
            "An account with this email is already registered.".to_string(),
        ));
    }

    let hashed_password = hash_password(&payload.password)?;

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (name, email, password_hash, registered_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, name, email, password_hash, registered_at, token_version
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, "Name or email is already registered.".to_string()))?;

    tracing::info!("Registered account {} ({})", account.id, account.name);

    Ok((StatusCode::CREATED, Json(account)))
}

/// Authenticates an account and returns a JWT token.
///
/// `remember` trades the normal token lifetime for the long one.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, name, email, password_hash, registered_at, token_version
        FROM accounts
        WHERE email = ?
        "#,
    )
    .bind(payload.email.trim())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let invalid = || AppError::AuthError("Invalid email or password.".to_string());
    let account = account.ok_or_else(invalid)?;

    if !account.verify_credentials(payload.password.trim())? {
        return Err(invalid());
    }

    let expires_in = if payload.remember {
        config.remember_expiration
    } else {
        config.jwt_expiration
    };

    let token = sign_jwt(
        account.account_id(),
        account.display_name(),
        account.token_version,
        &config.jwt_secret,
        expires_in,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "expires_in": expires_in,
        "name": account.display_name(),
    })))
}

/// Ends the session: every token issued so far stops authenticating and any
/// quiz in progress is discarded.
pub async fn logout(
    State(pool): State<SqlitePool>,
    State(sessions): State<QuizSessionStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = claims.account_id()?;

    sqlx::query("UPDATE accounts SET token_version = token_version + 1 WHERE id = ?")
        .bind(account_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to revoke tokens of account {}: {:?}", account_id, e);
            AppError::InternalServerError(e.to_string())
        })?;
    tracing::info!("Account {} ({}) logged out", account_id, claims.name);

    if sessions.clear(account_id) {
        tracing::debug!("Discarded in-progress quiz of account {} on logout", account_id);
    }

    Ok(Json(json!({
        "success": true,
        "message": "You have been logged out.",
    })))
}
