// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::packs::{fetch_attempt_scores, fetch_packs_with_counts},
    models::account::Account,
    quiz::stats::{Achievements, OverallStats, PackStats, achievements, overall_stats, stats_by_pack},
    utils::jwt::Claims,
};

/// Per-pack line of the profile, only for packs the account has played.
#[derive(Debug, Serialize)]
pub struct ProfilePackStats {
    pub pack_id: i64,
    pub pack_title: String,
    pub total_questions_in_pack: i64,
    #[serde(flatten)]
    pub stats: PackStats,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub account: Account,
    pub overall: OverallStats,
    pub packs: Vec<ProfilePackStats>,
    pub achievements: Achievements,
}

/// Get current account's profile and statistics.
pub async fn get_profile(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = claims.account_id()?;

    let account = sqlx::query_as::<_, Account>(
        "SELECT id, name, email, password_hash, registered_at, token_version FROM accounts WHERE id = ?",
    )
    .bind(account_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Account not found".to_string()))?;

    let attempts = fetch_attempt_scores(&pool, account_id).await?;
    let mut by_pack = stats_by_pack(&attempts);

    // Attempts of deleted packs are gone with the pack, so every group has a pack row.
    let packs = fetch_packs_with_counts(&pool)
        .await?
        .into_iter()
        .filter_map(|p| {
            by_pack.remove(&p.pack.id).map(|stats| ProfilePackStats {
                pack_id: p.pack.id,
                pack_title: p.pack.title,
                total_questions_in_pack: p.question_count,
                stats,
            })
        })
        .collect();

    Ok(Json(ProfileResponse {
        account,
        overall: overall_stats(&attempts),
        packs,
        achievements: achievements(&attempts),
    }))
}
