// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::quiz::stats::PackStats;

/// Represents the 'quiz_attempts' table in the database.
/// One row per completed quiz; never updated after insert.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub account_id: i64,
    pub pack_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    /// Seconds, only present when the client reported its elapsed time.
    pub avg_time_per_question: Option<f64>,
    pub answers: Json<Vec<AnswerRecord>>,
}

/// The scoring columns of an attempt, enough for every aggregate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttemptScore {
    pub id: i64,
    pub pack_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub avg_time_per_question: Option<f64>,
}

/// One graded answer as persisted in `quiz_attempts.answers`.
/// `user_answer_index` is in the stored option order, not the shuffled one.
/// A selection outside the presented options is kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: i64,
    pub user_answer_index: Option<i64>,
    pub is_correct: bool,
}

/// DTO for a single answer in a submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i64,
    /// Index into the options as they were presented; `null` for a skipped question.
    #[serde(default)]
    pub selected_answer_index: Option<i64>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    #[validate(range(min = 1, message = "Invalid quiz data."))]
    pub pack_id: i64,

    pub answers: Vec<SubmittedAnswer>,

    /// Total seconds spent on the quiz, as measured by the client.
    #[serde(rename = "totalTimeTaken", default)]
    #[validate(range(min = 0.0, message = "Invalid quiz data."))]
    pub total_time_taken: Option<f64>,
}

/// One row of the results breakdown, joined with the current question.
#[derive(Debug, Serialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub user_selected_index: Option<i64>,
    pub is_correct: bool,
    /// `-1` when the question no longer exists.
    pub correct_answer_index: i64,
    pub image_url: Option<String>,
}

/// Summary of the attempt being viewed.
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub avg_time_per_question: Option<f64>,
}

impl From<&QuizAttempt> for AttemptSummary {
    fn from(attempt: &QuizAttempt) -> Self {
        let percentage = if attempt.total_questions > 0 {
            attempt.score * 100 / attempt.total_questions
        } else {
            0
        };
        Self {
            id: attempt.id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            percentage,
            completed_at: attempt.completed_at,
            avg_time_per_question: attempt.avg_time_per_question,
        }
    }
}

/// Response body of the results view.
#[derive(Debug, Serialize)]
pub struct QuizResultsResponse {
    pub pack_id: i64,
    pub pack_title: String,
    pub attempt: AttemptSummary,
    pub results: Vec<QuestionResult>,
    pub pack_stats: PackStats,
    pub total_questions_in_pack: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_wire_format() {
        let req: SubmitQuizRequest = serde_json::from_str(
            r#"{
                "pack_id": 3,
                "answers": [
                    {"questionId": 10, "selectedAnswerIndex": 1},
                    {"questionId": 11, "selectedAnswerIndex": null},
                    {"questionId": 12}
                ],
                "totalTimeTaken": 12.5
            }"#,
        )
        .unwrap();

        assert_eq!(req.pack_id, 3);
        assert_eq!(req.answers.len(), 3);
        assert_eq!(req.answers[0].selected_answer_index, Some(1));
        assert_eq!(req.answers[1].selected_answer_index, None);
        assert_eq!(req.answers[2].selected_answer_index, None);
        assert_eq!(req.total_time_taken, Some(12.5));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_submission_rejects_bad_shapes() {
        let not_a_list =
            serde_json::from_str::<SubmitQuizRequest>(r#"{"pack_id": 1, "answers": {"1": 2}}"#);
        assert!(not_a_list.is_err());

        let missing_pack = serde_json::from_str::<SubmitQuizRequest>(r#"{"answers": []}"#);
        assert!(missing_pack.is_err());

        let zero_pack: SubmitQuizRequest =
            serde_json::from_str(r#"{"pack_id": 0, "answers": []}"#).unwrap();
        assert!(zero_pack.validate().is_err());

        let negative_time: SubmitQuizRequest =
            serde_json::from_str(r#"{"pack_id": 1, "answers": [], "totalTimeTaken": -4}"#).unwrap();
        assert!(negative_time.validate().is_err());
    }
}
