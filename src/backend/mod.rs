// src/backend/mod.rs

//! The remote collaborator that owns the question bank, participants and
//! submissions. The session engine only talks to it through [`QuizBackend`].

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    participant::Participant,
    question::Question,
    submission::Answer,
};

/// Errors reported by a backend.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Operations the session engine needs from the backend.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Full bank, in bank order.
    async fn fetch_question_bank(&self) -> Result<Vec<Question>, BackendError>;

    /// Stores a scored attempt. Called at most once per submit trigger.
    async fn submit_attempt(
        &self,
        registration_number: &str,
        answers: &[Answer],
        score: u32,
    ) -> Result<(), BackendError>;

    async fn get_participant(&self, registration_number: &str) -> Result<Participant, BackendError>;

    async fn has_submitted(&self, registration_number: &str) -> Result<bool, BackendError>;
}
