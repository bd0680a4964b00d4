// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    backend::memory::MemoryBackend,
    config::LEADERBOARD_LIMIT,
    error::AppError,
    models::{
        participant::{SearchQuery, WhitelistRequest},
        question::{QuestionFilter, QuestionRequest},
    },
    session::manager::SessionManager,
    state::AppState,
    utils::{
        csv::render_export,
        hash::verify_secret,
        html::clean_html,
        jwt::{ADMIN_ROLE, sign_jwt},
    },
};

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 256))]
    pub secret: String,
}

/// Exchanges the admin secret for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hash = state
        .admin_hash
        .as_deref()
        .ok_or_else(|| AppError::Forbidden("Admin access is not configured".to_string()))?;

    if !verify_secret(&payload.secret, hash)? {
        tracing::warn!("Rejected admin login attempt");
        return Err(AppError::AuthError("Invalid admin secret".to_string()));
    }

    let token = sign_jwt(
        ADMIN_ROLE,
        ADMIN_ROLE,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

/// Lists questions, optionally filtered by `round` and `subject`.
pub async fn list_questions(
    State(store): State<Arc<MemoryBackend>>,
    Query(filter): Query<QuestionFilter>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_questions(&filter).await))
}

/// Distinct rounds and subjects for the filter dropdowns.
pub async fn question_facets(
    State(store): State<Arc<MemoryBackend>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.question_facets().await))
}

pub async fn get_question(
    State(store): State<Arc<MemoryBackend>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.get_question(id).await?))
}

/// Creates a new quiz question.
pub async fn create_question(
    State(store): State<Arc<MemoryBackend>>,
    Json(mut payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.text = clean_html(&payload.text);

    let question = store.add_question(payload).await;
    tracing::info!(id = question.id, round = question.round, "Question created");

    Ok((StatusCode::CREATED, Json(question)))
}

/// Replaces a question by ID.
pub async fn update_question(
    State(store): State<Arc<MemoryBackend>>,
    Path(id): Path<u64>,
    Json(mut payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.text = clean_html(&payload.text);

    let question = store.update_question(id, payload).await?;
    Ok(Json(question))
}

/// Deletes a question by ID.
/// Sessions that already sampled it keep their copy.
pub async fn delete_question(
    State(store): State<Arc<MemoryBackend>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    store.delete_question(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_whitelist(
    State(store): State<Arc<MemoryBackend>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let needle = query.needle();
    Ok(Json(store.list_whitelist(needle.as_deref()).await))
}

pub async fn add_whitelisted_email(
    State(store): State<Arc<MemoryBackend>>,
    Json(payload): Json<WhitelistRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let email = store.add_whitelisted_email(&payload.email).await?;
    Ok((StatusCode::CREATED, Json(json!({ "email": email }))))
}

pub async fn remove_whitelisted_email(
    State(store): State<Arc<MemoryBackend>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    store.remove_whitelisted_email(&email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Participants with their scores, searchable by name or registration number.
pub async fn list_participants(
    State(store): State<Arc<MemoryBackend>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let needle = query.needle();
    Ok(Json(store.list_participants(needle.as_deref()).await))
}

pub async fn leaderboard(
    State(store): State<Arc<MemoryBackend>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.leaderboard(LEADERBOARD_LIMIT).await))
}

/// Downloads all submissions as CSV.
pub async fn export_results(
    State(store): State<Arc<MemoryBackend>>,
) -> Result<impl IntoResponse, AppError> {
    let rows = store.export_rows().await;
    tracing::info!(rows = rows.len(), "Exporting results");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"quiz-results.csv\"",
            ),
        ],
        render_export(&rows),
    ))
}

/// Drops submitted and abandoned sessions from memory.
pub async fn purge_sessions(
    State(sessions): State<Arc<SessionManager>>,
) -> Result<impl IntoResponse, AppError> {
    let purged = sessions.purge_finished().await;
    Ok(Json(json!({ "purged": purged })))
}
