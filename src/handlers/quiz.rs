// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attempt::{
            AttemptScore, AttemptSummary, QuestionResult, QuizAttempt, QuizResultsResponse,
            SubmitQuizRequest,
        },
        pack::QuizPack,
        question::Question,
    },
    quiz::{
        engine::{QuizPayload, deal},
        grading::{GradedQuiz, grade},
        session::{ActiveQuiz, QuizSessionStore},
        stats::pack_stats,
    },
    utils::jwt::Claims,
};

pub(crate) async fn fetch_pack(pool: &SqlitePool, pack_id: i64) -> Result<QuizPack, AppError> {
    sqlx::query_as::<_, QuizPack>(
        r#"
        SELECT id, title, description, image_url, color, difficulty,
               time_to_complete_minutes, created_at
        FROM quiz_packs
        WHERE id = ?
        "#,
    )
    .bind(pack_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz pack not found.".to_string()))
}

pub(crate) async fn fetch_questions(
    pool: &SqlitePool,
    pack_id: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, pack_id, question_text, options, correct_answer_index, image_url
        FROM questions
        WHERE pack_id = ?
        ORDER BY id
        "#,
    )
    .bind(pack_id)
    .fetch_all(pool)
    .await
}

/// Starts a quiz on a pack.
///
/// Deals a shuffled question set, remembers the answer key for this account
/// (replacing any quiz it had in progress) and returns the questions without
/// their answers.
pub async fn start_quiz(
    State(pool): State<SqlitePool>,
    State(sessions): State<QuizSessionStore>,
    Extension(claims): Extension<Claims>,
    Path(pack_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = claims.account_id()?;
    let pack = fetch_pack(&pool, pack_id).await?;

    let questions = fetch_questions(&pool, pack_id).await.map_err(|e| {
        tracing::error!("Failed to fetch questions for pack {}: {:?}", pack_id, e);
        AppError::from(e)
    })?;

    let dealt = deal(questions, &mut rand::thread_rng()).map_err(|e| match e {
        AppError::EmptyContent(_) => AppError::EmptyContent(format!(
            "The quiz '{}' currently has no questions.",
            pack.title
        )),
        other => other,
    })?;

    sessions.start(account_id, ActiveQuiz::new(pack_id, dealt.answer_key));
    tracing::info!(
        "Account {} started pack {} with {} questions",
        account_id,
        pack_id,
        dealt.questions.len()
    );

    Ok(Json(QuizPayload {
        pack_id,
        title: pack.title,
        questions: dealt.questions,
    }))
}

/// Inserts the graded attempt inside a transaction and returns its id.
async fn record_attempt(
    pool: &SqlitePool,
    account_id: i64,
    pack_id: i64,
    graded: GradedQuiz,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO quiz_attempts
        (account_id, pack_id, score, total_questions, completed_at, avg_time_per_question, answers)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(account_id)
    .bind(pack_id)
    .bind(graded.score)
    .bind(graded.total_questions)
    .bind(chrono::Utc::now())
    .bind(graded.avg_time_per_question)
    .bind(SqlJson(graded.answers))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(result.last_insert_rowid())
}

/// Submits answers for the quiz in progress and records the attempt.
///
/// * The answer key is taken out of the session store before grading, so a
///   repeated submit finds nothing and fails.
/// * The score counts against the questions that were dealt, not the ones sent.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    State(sessions): State<QuizSessionStore>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubmitQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = claims.account_id()?;
    let Json(req) = payload?;
    req.validate()?;

    fetch_pack(&pool, req.pack_id).await?;

    let active = sessions.take(account_id, req.pack_id)?;
    let graded = grade(&active.answer_key, &req.answers, req.total_time_taken);
    let (score, total_questions) = (graded.score, graded.total_questions);

    let attempt_id = record_attempt(&pool, account_id, req.pack_id, graded)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to record attempt for account {} on pack {}: {:?}",
                account_id,
                req.pack_id,
                e
            );
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(
        "Account {} scored {}/{} on pack {} (attempt {})",
        account_id,
        score,
        total_questions,
        req.pack_id,
        attempt_id
    );

    Ok(Json(json!({
        "success": true,
        "redirect_url": format!("/quiz_results/{}/{}", req.pack_id, attempt_id),
        "attempt_id": attempt_id,
        "score": score,
        "total_questions": total_questions,
    })))
}

/// Shows one attempt's breakdown and the account's record on the pack.
///
/// The attempt must belong to the caller; someone else's attempt is reported
/// as not found.
pub async fn quiz_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((pack_id, attempt_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = claims.account_id()?;
    let pack = fetch_pack(&pool, pack_id).await?;

    let attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, account_id, pack_id, score, total_questions, completed_at,
               avg_time_per_question, answers
        FROM quiz_attempts
        WHERE id = ? AND account_id = ? AND pack_id = ?
        "#,
    )
    .bind(attempt_id)
    .bind(account_id)
    .bind(pack_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz attempt not found.".to_string()))?;

    let questions: HashMap<i64, Question> = fetch_questions(&pool, pack_id)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();
    let total_questions_in_pack = questions.len() as i64;

    let results = attempt
        .answers
        .0
        .iter()
        .map(|record| match questions.get(&record.question_id) {
            Some(q) => QuestionResult {
                question_id: q.id,
                question_text: q.question_text.clone(),
                options: q.options.0.clone(),
                user_selected_index: record.user_answer_index,
                is_correct: record.is_correct,
                correct_answer_index: q.correct_answer_index,
                image_url: q.image_url.clone(),
            },
            None => QuestionResult {
                question_id: record.question_id,
                question_text: format!(
                    "Question (ID: {}) not found in pack.",
                    record.question_id
                ),
                options: Vec::new(),
                user_selected_index: record.user_answer_index,
                is_correct: false,
                correct_answer_index: -1,
                image_url: None,
            },
        })
        .collect();

    let history = sqlx::query_as::<_, AttemptScore>(
        r#"
        SELECT id, pack_id, score, total_questions, completed_at, avg_time_per_question
        FROM quiz_attempts
        WHERE account_id = ? AND pack_id = ?
        "#,
    )
    .bind(account_id)
    .bind(pack_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(QuizResultsResponse {
        pack_id,
        pack_title: pack.title,
        attempt: AttemptSummary::from(&attempt),
        results,
        pack_stats: pack_stats(&history),
        total_questions_in_pack,
    }))
}
