// src/models/pack.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use url::Url;
use validator::Validate;

use crate::quiz::stats::PackStats;

/// Colour tags are either a plain CSS colour name or a `#rrggbb` hex code.
static COLOR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z]{3,20}|#[0-9a-fA-F]{6})$").unwrap());

/// Represents the 'quiz_packs' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizPack {
    pub id: i64,

    /// Unique pack title.
    pub title: String,

    pub description: Option<String>,

    pub image_url: Option<String>,

    /// UI colour tag (e.g., "blue").
    pub color: String,

    /// Free-form difficulty label (e.g., "Easy", "Hard").
    pub difficulty: String,

    /// Estimated completion time.
    pub time_to_complete_minutes: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A pack joined with how many questions it currently holds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pack: QuizPack,
    pub question_count: i64,
}

/// Catalog entry: a pack plus the requesting account's history on it.
#[derive(Debug, Serialize)]
pub struct PackSummary {
    #[serde(flatten)]
    pub pack: PackWithCount,
    pub stats: PackStats,
}

/// DTO for creating a new pack.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePackRequest {
    #[validate(length(min = 1, max = 100, message = "Quiz pack title cannot be empty."))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 200), custom(function = validate_image_url))]
    pub image_url: Option<String>,
    #[serde(default = "default_color")]
    #[validate(regex(path = *COLOR_TAG, message = "Colour must be a name or #rrggbb."))]
    pub color: String,
    #[serde(default = "default_difficulty")]
    #[validate(length(min = 1, max = 20))]
    pub difficulty: String,
    #[serde(default = "default_minutes")]
    #[validate(range(min = 1, message = "Completion time must be a positive number of minutes."))]
    pub time_to_complete_minutes: i64,
}

/// DTO for updating a pack. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePackRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 200), custom(function = validate_image_url))]
    pub image_url: Option<String>,
    #[validate(regex(path = *COLOR_TAG))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1))]
    pub time_to_complete_minutes: Option<i64>,
}

impl UpdatePackRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.color.is_none()
            && self.difficulty.is_none()
            && self.time_to_complete_minutes.is_none()
    }
}

fn default_color() -> String {
    "blue".to_string()
}

fn default_difficulty() -> String {
    "Easy".to_string()
}

fn default_minutes() -> i64 {
    10
}

/// Accepts an absolute URL or a path under the static directory (e.g. "images/cat.png").
pub(crate) fn validate_image_url(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_ok() {
        return Ok(());
    }
    let relative_ok = !url.is_empty()
        && !url.starts_with('/')
        && !url.contains("..")
        && !url.contains("://")
        && !url.chars().any(char::is_whitespace);
    if !relative_ok {
        return Err(validator::ValidationError::new("invalid_image_url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, color: &str, minutes: i64) -> CreatePackRequest {
        CreatePackRequest {
            title: title.to_string(),
            description: None,
            image_url: None,
            color: color.to_string(),
            difficulty: "Easy".to_string(),
            time_to_complete_minutes: minutes,
        }
    }

    #[test]
    fn test_create_pack_validation() {
        assert!(create("Capitals", "blue", 10).validate().is_ok());
        assert!(create("Capitals", "#12ab9F", 10).validate().is_ok());
        assert!(create("", "blue", 10).validate().is_err());
        assert!(create("Capitals", "blue; drop", 10).validate().is_err());
        assert!(create("Capitals", "blue", 0).validate().is_err());
    }

    #[test]
    fn test_create_pack_defaults() {
        let req: CreatePackRequest = serde_json::from_str(r#"{"title": "P"}"#).unwrap();
        assert_eq!(req.color, "blue");
        assert_eq!(req.difficulty, "Easy");
        assert_eq!(req.time_to_complete_minutes, 10);
    }

    #[test]
    fn test_image_url_forms() {
        assert!(validate_image_url("https://cdn.example.com/a.png").is_ok());
        assert!(validate_image_url("images/a.png").is_ok());
        assert!(validate_image_url("../secret").is_err());
        assert!(validate_image_url("/etc/passwd").is_err());
        assert!(validate_image_url("has space.png").is_err());
    }
}
