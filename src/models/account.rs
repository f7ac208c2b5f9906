// src/models/account.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{error::AppError, utils::hash::verify_password};

/// Something that can log in: has a stable id and can check a password.
pub trait Authenticatable {
    fn account_id(&self) -> i64;

    fn display_name(&self) -> &str;

    /// Returns `Ok(false)` on a wrong password; `Err` only when the stored hash is unusable.
    fn verify_credentials(&self, password: &str) -> Result<bool, AppError>;
}

/// Represents the 'accounts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,

    /// Unique display name.
    pub name: String,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub registered_at: chrono::DateTime<chrono::Utc>,

    /// Must match the `ver` claim of a token for it to authenticate.
    #[serde(skip)]
    pub token_version: i64,
}

impl Authenticatable for Account {
    fn account_id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn verify_credentials(&self, password: &str) -> Result<bool, AppError> {
        verify_password(password, &self.password_hash)
    }
}

/// DTO for creating a new account (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 1,
        max = 80,
        message = "Name length must be between 1 and 80 characters."
    ))]
    pub name: String,
    #[validate(email(message = "Email address is not valid."))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password length must be between 1 and 128 characters."
    ))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl RegisterRequest {
    /// Strips surrounding whitespace from every field, the way the form did.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
            confirm_password: self.confirm_password.trim().to_string(),
        }
    }
}

/// DTO for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 120))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    /// Asks for a long-lived token.
    #[serde(default)]
    pub remember: bool,
}
