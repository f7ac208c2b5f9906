// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::{AppError, conflict_or_internal},
    handlers::{
        packs::fetch_packs_with_counts,
        quiz::{fetch_pack, fetch_questions},
    },
    models::{
        pack::{CreatePackRequest, UpdatePackRequest},
        question::{CreateQuestionRequest, Question, UpdateQuestionRequest},
    },
    utils::html::clean_html,
};

/// Lists all packs with their question counts.
pub async fn list_packs(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let packs = fetch_packs_with_counts(&pool).await.map_err(|e| {
        tracing::error!("Failed to list packs: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(packs))
}

/// Shows one pack with its questions, answers included.
pub async fn get_pack(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pack = fetch_pack(&pool, id).await?;
    let questions = fetch_questions(&pool, id).await?;

    Ok(Json(serde_json::json!({
        "pack": pack,
        "questions": questions,
    })))
}

/// Creates a new quiz pack.
pub async fn create_pack(
    State(pool): State<SqlitePool>,
    payload: Result<Json<CreatePackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let title = payload.title.trim().to_string();
    let description = payload.description.as_deref().map(clean_html);

    let id = sqlx::query(
        r#"
        INSERT INTO quiz_packs
        (title, description, image_url, color, difficulty, time_to_complete_minutes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&title)
    .bind(description)
    .bind(payload.image_url)
    .bind(payload.color)
    .bind(payload.difficulty)
    .bind(payload.time_to_complete_minutes)
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        conflict_or_internal(e, "A quiz pack with this title already exists!".to_string())
    })?
    .last_insert_rowid();

    tracing::info!("Created pack {} '{}'", id, title);

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a pack by ID. Absent fields are left alone.
pub async fn update_pack(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdatePackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    if payload.is_empty() {
        fetch_pack(&pool, id).await?;
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE quiz_packs SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title.trim().to_string());
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(clean_html(&description));
    }

    if let Some(image_url) = payload.image_url {
        separated.push("image_url = ");
        separated.push_bind_unseparated(image_url);
    }

    if let Some(color) = payload.color {
        separated.push("color = ");
        separated.push_bind_unseparated(color);
    }

    if let Some(difficulty) = payload.difficulty {
        separated.push("difficulty = ");
        separated.push_bind_unseparated(difficulty);
    }

    if let Some(minutes) = payload.time_to_complete_minutes {
        separated.push("time_to_complete_minutes = ");
        separated.push_bind_unseparated(minutes);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update pack {}: {:?}", id, e);
        conflict_or_internal(e, "A quiz pack with this title already exists!".to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz pack not found.".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a pack together with its questions and every attempt on it.
pub async fn delete_pack(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM quiz_attempts WHERE pack_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM questions WHERE pack_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM quiz_packs WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete pack {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        // Dropping `tx` rolls back; there was nothing to delete anyway.
        return Err(AppError::NotFound("Quiz pack not found.".to_string()));
    }

    tx.commit().await?;
    tracing::info!("Deleted pack {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Adds a question to a pack.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Path(pack_id): Path<i64>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let mut tx = pool.begin().await?;

    let pack_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM quiz_packs WHERE id = ?")
        .bind(pack_id)
        .fetch_optional(&mut *tx)
        .await?;
    if pack_exists.is_none() {
        return Err(AppError::NotFound("Quiz pack not found.".to_string()));
    }

    let id = sqlx::query(
        r#"
        INSERT INTO questions
        (pack_id, question_text, options, correct_answer_index, image_url)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(pack_id)
    .bind(payload.question_text.trim())
    .bind(SqlJson(&payload.options))
    .bind(payload.correct_answer_index)
    .bind(&payload.image_url)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .last_insert_rowid();

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a question by ID.
///
/// The stored row and the update are merged first, so an index change is
/// checked against the options that will actually be stored.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateQuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, pack_id, question_text, options, correct_answer_index, image_url
        FROM questions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let merged = payload.merge_into(current);
    merged.validate()?;

    sqlx::query(
        r#"
        UPDATE questions
        SET question_text = ?, options = ?, correct_answer_index = ?, image_url = ?
        WHERE id = ?
        "#,
    )
    .bind(merged.question_text.trim())
    .bind(SqlJson(&merged.options))
    .bind(merged.correct_answer_index)
    .bind(&merged.image_url)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tx.commit().await?;

    Ok(StatusCode::OK)
}

/// Deletes a quiz question by ID.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
