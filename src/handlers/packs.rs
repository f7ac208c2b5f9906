// src/handlers/packs.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        attempt::AttemptScore,
        pack::{PackSummary, PackWithCount},
    },
    quiz::stats::{overall_stats, stats_by_pack},
    utils::jwt::Claims,
};

/// Every pack with its question count, newest last.
pub(crate) async fn fetch_packs_with_counts(
    pool: &SqlitePool,
) -> Result<Vec<PackWithCount>, sqlx::Error> {
    sqlx::query_as::<_, PackWithCount>(
        r#"
        SELECT
            p.id, p.title, p.description, p.image_url, p.color, p.difficulty,
            p.time_to_complete_minutes, p.created_at,
            (SELECT COUNT(*) FROM questions q WHERE q.pack_id = p.id) AS question_count
        FROM quiz_packs p
        ORDER BY p.id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Every attempt of one account, oldest first.
pub(crate) async fn fetch_attempt_scores(
    pool: &SqlitePool,
    account_id: i64,
) -> Result<Vec<AttemptScore>, sqlx::Error> {
    sqlx::query_as::<_, AttemptScore>(
        r#"
        SELECT id, pack_id, score, total_questions, completed_at, avg_time_per_question
        FROM quiz_attempts
        WHERE account_id = ?
        ORDER BY completed_at ASC, id ASC
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}

/// Lists all packs with the current account's statistics on each.
pub async fn list_packs(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = claims.account_id()?;

    let packs = fetch_packs_with_counts(&pool).await.map_err(|e| {
        tracing::error!("Failed to list packs: {:?}", e);
        AppError::from(e)
    })?;
    let attempts = fetch_attempt_scores(&pool, account_id).await?;

    let mut by_pack = stats_by_pack(&attempts);
    let summaries: Vec<PackSummary> = packs
        .into_iter()
        .map(|pack| {
            let stats = by_pack.remove(&pack.pack.id).unwrap_or_default();
            PackSummary { pack, stats }
        })
        .collect();

    Ok(Json(json!({
        "packs": summaries,
        "user_stats": overall_stats(&attempts),
    })))
}
