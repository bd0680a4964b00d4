// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    backend::memory::MemoryBackend,
    config::LEADERBOARD_LIMIT,
    error::AppError,
    session::manager::SessionManager,
};

/// DTO for starting a quiz session.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub registration_number: String,
}

/// DTO for recording one answer. The text is stored as given.
#[derive(Debug, Deserialize)]
pub struct RecordAnswerRequest {
    pub question_id: u64,
    #[serde(default)]
    pub answer: String,
}

/// Starts a timed session for a registered participant.
///
/// Samples the questions, starts the clock and returns the questions
/// without their answers.
pub async fn start_session(
    State(sessions): State<Arc<SessionManager>>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let registration_number = req.registration_number.trim();
    if registration_number.is_empty() {
        return Err(AppError::BadRequest(
            "Registration number not found. Please register first.".to_string(),
        ));
    }

    let started = sessions.start_session(registration_number).await?;
    Ok((StatusCode::CREATED, Json(started)))
}

/// Current state of a session: clock, counts, questions and answers so far.
pub async fn get_session(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions.view(session_id).await?;
    Ok(Json(view))
}

/// Records (or overwrites) the answer to one question.
pub async fn record_answer(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    sessions
        .record_answer(session_id, req.question_id, req.answer)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Manual submission.
///
/// A second submit while one is running (or after it succeeded) is not an
/// error; it reports `ignored`. A backend failure returns 502 and the
/// participant may submit again.
pub async fn submit(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = sessions.submit(session_id).await?;
    Ok(Json(outcome))
}

/// Leaves the quiz without submitting.
pub async fn abandon(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !sessions.abandon(session_id).await? {
        return Err(AppError::Conflict(
            "Submission already in progress or completed".to_string(),
        ));
    }
    Ok(Json(json!({ "abandoned": true })))
}

/// Score, questions and answers of a submitted attempt.
pub async fn get_results(
    State(store): State<Arc<MemoryBackend>>,
    Path(registration_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.detailed_results(&registration_number).await?;
    Ok(Json(results))
}

/// Top scores.
pub async fn get_leaderboard(
    State(store): State<Arc<MemoryBackend>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.leaderboard(LEADERBOARD_LIMIT).await))
}
