// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Every question carries exactly this many answer options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Minimum attempt length before an attempt counts towards achievements.
pub const ACHIEVEMENT_MIN_QUESTIONS: i64 = 5;

/// "Sharpshooter" ceiling on average seconds per question.
pub const SPEED_MAX_AVG_SECONDS: f64 = 3.0;

/// "Sharpshooter" floor on the accuracy of that same attempt, in percent.
pub const SPEED_MIN_ACCURACY: f64 = 80.0;

/// Where the catalog lives; clients are sent back here when a quiz cannot start.
pub const CATALOG_PATH: &str = "/packs";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    /// Token lifetime in seconds when the account asked to be remembered.
    pub remember_expiration: u64,
    /// How long an unsubmitted quiz keeps its answer key, in seconds.
    pub quiz_session_ttl: u64,
    pub rust_log: String,
    pub static_dir: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quiz.db".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = parse_or("JWT_EXPIRATION", 60 * 60 * 24);
        let remember_expiration = parse_or("REMEMBER_EXPIRATION", 60 * 60 * 24 * 30);
        let quiz_session_ttl = parse_or("QUIZ_SESSION_TTL", 60 * 60 * 2);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let static_dir = env::var("STATIC_DIR")
            .unwrap_or_else(|_| "static".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            remember_expiration,
            quiz_session_ttl,
            rust_log,
            static_dir,
            bind_addr,
        }
    }
}

fn parse_or(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{} is not a number ({}), using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
