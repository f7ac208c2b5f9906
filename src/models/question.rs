// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::{Validate, ValidationError};

use crate::{config::OPTIONS_PER_QUESTION, models::pack::validate_image_url};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub pack_id: i64,

    /// The text content of the question.
    pub question_text: String,

    /// Answer options in stored order (e.g., ["Paris", "Rome", ...]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Zero-based index into `options`.
    pub correct_answer_index: i64,

    pub image_url: Option<String>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_answer_index, skip_on_field_errors = true))]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 500))]
    pub question_text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub correct_answer_index: i64,
    #[validate(length(max = 200), custom(function = validate_image_url))]
    pub image_url: Option<String>,
}

/// DTO for updating a question. Fields are optional; the merged result is
/// validated as a `CreateQuestionRequest`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub question_text: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer_index: Option<i64>,
    pub image_url: Option<String>,
}

impl UpdateQuestionRequest {
    /// Overlays the present fields onto the stored question.
    /// An empty `image_url` removes the image.
    pub fn merge_into(self, current: Question) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: self.question_text.unwrap_or(current.question_text),
            options: self.options.unwrap_or(current.options.0),
            correct_answer_index: self
                .correct_answer_index
                .unwrap_or(current.correct_answer_index),
            image_url: match self.image_url {
                Some(url) if url.trim().is_empty() => None,
                Some(url) => Some(url),
                None => current.image_url,
            },
        }
    }
}

fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(ValidationError::new("wrong_option_count"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

fn validate_answer_index(req: &CreateQuestionRequest) -> Result<(), ValidationError> {
    let in_bounds = usize::try_from(req.correct_answer_index)
        .map(|idx| idx < req.options.len())
        .unwrap_or(false);
    if !in_bounds {
        let mut err = ValidationError::new("correct_answer_index_out_of_bounds");
        err.message = Some("Correct answer index must point at one of the options.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four() -> Vec<String> {
        ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect()
    }

    fn create(options: Vec<String>, index: i64) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: "2 + 2?".to_string(),
            options,
            correct_answer_index: index,
            image_url: None,
        }
    }

    #[test]
    fn test_index_bounds() {
        assert!(create(four(), 0).validate().is_ok());
        assert!(create(four(), 3).validate().is_ok());
        assert!(create(four(), 4).validate().is_err());
        assert!(create(four(), -1).validate().is_err());
    }

    #[test]
    fn test_option_shape() {
        assert!(create(four()[..3].to_vec(), 0).validate().is_err());
        let mut blank = four();
        blank[2] = "  ".to_string();
        assert!(create(blank, 0).validate().is_err());
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let current = Question {
            id: 1,
            pack_id: 1,
            question_text: "old".to_string(),
            options: Json(four()),
            correct_answer_index: 2,
            image_url: Some("images/q.png".to_string()),
        };
        let update = UpdateQuestionRequest {
            question_text: Some("new".to_string()),
            options: None,
            correct_answer_index: None,
            image_url: None,
        };

        let merged = update.merge_into(current);
        assert_eq!(merged.question_text, "new");
        assert_eq!(merged.options, four());
        assert_eq!(merged.correct_answer_index, 2);
        assert_eq!(merged.image_url.as_deref(), Some("images/q.png"));
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_empty_image_url_clears_image() {
        let current = Question {
            id: 1,
            pack_id: 1,
            question_text: "old".to_string(),
            options: Json(four()),
            correct_answer_index: 0,
            image_url: Some("images/q.png".to_string()),
        };
        let update: UpdateQuestionRequest = serde_json::from_str(r#"{"image_url": ""}"#).unwrap();

        let merged = update.merge_into(current);
        assert_eq!(merged.image_url, None);
        assert!(merged.validate().is_ok());
    }
}
