// src/handlers/registration.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    backend::{QuizBackend, memory::MemoryBackend},
    error::AppError,
    models::participant::{EmailQuery, RegisterParticipantRequest},
};

/// Registers a participant.
///
/// The email must be whitelisted (403 otherwise) and the registration
/// number unused (409 otherwise).
pub async fn register(
    State(store): State<Arc<MemoryBackend>>,
    Json(payload): Json<RegisterParticipantRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let participant = store.register_participant(payload).await?;
    tracing::info!(
        registration_number = %participant.registration_number,
        "Participant registered"
    );

    Ok((StatusCode::CREATED, Json(participant)))
}

/// Tells the registration form whether an email may register.
pub async fn check_whitelist(
    State(store): State<Arc<MemoryBackend>>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let whitelisted = store.is_email_whitelisted(&query.email).await;
    Ok(Json(json!({ "whitelisted": whitelisted })))
}

pub async fn get_participant(
    State(store): State<Arc<MemoryBackend>>,
    Path(registration_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let participant = store.get_participant(&registration_number).await?;
    Ok(Json(participant))
}
