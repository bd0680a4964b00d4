// src/session/mod.rs

//! Quiz session engine.
//!
//! A session freezes a sampled set of questions, starts a countdown, collects
//! answers and produces exactly one submission record, either when the
//! participant submits or when the clock runs out. Both exits go through
//! [`QuizSession::finalize`].

pub mod clock;
pub mod guard;
pub mod ledger;
pub mod manager;
pub mod sampler;

use serde::Serialize;
use thiserror::Error;

use crate::{
    backend::BackendError,
    models::{
        question::{PublicQuestion, Question},
        submission::{Answer, SubmissionRecord},
    },
};

use self::{
    clock::{SessionClock, Tick},
    guard::SubmitLatch,
    ledger::AnswerLedger,
};

/// Errors emitted by the session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available")]
    EmptyBank,
    #[error("session not found")]
    NotFound,
    #[error("session already started")]
    AlreadyStarted,
    #[error("question {0} is not part of this session")]
    UnknownQuestion(u64),
    #[error("quiz already submitted")]
    AlreadySubmitted,
    #[error("participant {0} already has a session in progress")]
    AlreadyActive(String),
    #[error("participant {0} abandoned their attempt")]
    Abandoned(String),
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Lifecycle of a session's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    Running,
    SubmittedManually,
    ExpiredAutoSubmit,
    /// Left without submitting; never scored.
    Abandoned,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::NotStarted | Self::Running)
    }
}

/// What caused a finalize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Expiry,
}

/// Result of a clock tick as seen by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Running(u32),
    /// The clock hit zero. Carries the record to deliver, unless a manual
    /// submission already holds the latch.
    Expired(Option<SubmissionRecord>),
    /// Not running; the ticker should stop.
    Stopped,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub registration_number: String,
    pub phase: SessionPhase,
    pub submission: SubmitLatch,
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub attempted: usize,
    pub unattempted: usize,
    /// Set once the backend confirmed the submission.
    pub score: Option<u32>,
}

/// One participant's timed attempt.
#[derive(Debug)]
pub struct QuizSession {
    registration_number: String,
    questions: Vec<Question>,
    ledger: AnswerLedger,
    clock: SessionClock,
    phase: SessionPhase,
    latch: SubmitLatch,
    /// Last record built, keyed by the ledger revision it was built from.
    pending: Option<(u64, SubmissionRecord)>,
}

impl QuizSession {
    /// Creates a session over an already sampled set of questions.
    pub fn new(
        registration_number: impl Into<String>,
        questions: Vec<Question>,
        duration: u32,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyBank);
        }

        Ok(Self {
            registration_number: registration_number.into(),
            questions,
            ledger: AnswerLedger::new(),
            clock: SessionClock::new(duration),
            phase: SessionPhase::NotStarted,
            latch: SubmitLatch::default(),
            pending: None,
        })
    }

    pub fn registration_number(&self) -> &str {
        &self.registration_number
    }

    pub fn public_questions(&self) -> Vec<PublicQuestion> {
        self.questions.iter().map(PublicQuestion::from).collect()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn latch(&self) -> SubmitLatch {
        self.latch
    }

    pub fn remaining(&self) -> u32 {
        self.clock.remaining()
    }

    pub fn answers(&self) -> Vec<Answer> {
        self.ledger.answers_for(&self.questions)
    }

    /// Confirmed or abandoned; nothing more can happen to this session.
    pub fn is_finished(&self) -> bool {
        matches!(self.latch, SubmitLatch::Confirmed | SubmitLatch::Closed)
    }

    /// Starts the clock. Only valid once.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        self.phase = SessionPhase::Running;
        tracing::info!(
            registration_number = %self.registration_number,
            questions = self.questions.len(),
            duration = self.clock.total(),
            "Quiz session started"
        );
        Ok(())
    }

    /// Advances the clock by one unit. Reaching zero finalizes the session.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Running {
            return TickOutcome::Stopped;
        }

        match self.clock.tick() {
            Tick::Remaining(left) => TickOutcome::Running(left),
            Tick::Expired | Tick::Stopped => {
                tracing::info!(
                    registration_number = %self.registration_number,
                    "Time is up, auto-submitting"
                );
                TickOutcome::Expired(self.finalize(Trigger::Expiry))
            }
        }
    }

    /// Records an answer for one of the sampled questions.
    pub fn record(&mut self, question_id: u64, text: impl Into<String>) -> Result<(), SessionError> {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(SessionError::UnknownQuestion(question_id));
        }
        if self.latch.is_confirmed() {
            return Err(SessionError::AlreadySubmitted);
        }
        self.ledger.record(question_id, text);
        Ok(())
    }

    /// Shared exit of manual submission and expiry.
    ///
    /// Returns the record to hand to the backend, or `None` when the trigger
    /// must be ignored (an attempt is in flight, already confirmed, or the
    /// session was abandoned).
    pub fn finalize(&mut self, trigger: Trigger) -> Option<SubmissionRecord> {
        if self.phase == SessionPhase::NotStarted {
            return None;
        }
        if !self.latch.try_acquire() {
            tracing::debug!(
                registration_number = %self.registration_number,
                ?trigger,
                "Ignoring duplicate submit trigger"
            );
            return None;
        }

        if self.phase == SessionPhase::Running {
            self.phase = match trigger {
                Trigger::Manual => SessionPhase::SubmittedManually,
                Trigger::Expiry => SessionPhase::ExpiredAutoSubmit,
            };
        }

        Some(self.build_record())
    }

    /// Reports the outcome of the backend call for the record last returned
    /// by [`finalize`](Self::finalize).
    pub fn complete(&mut self, accepted: bool) {
        if accepted {
            self.latch.confirm();
            tracing::info!(
                registration_number = %self.registration_number,
                score = ?self.pending.as_ref().map(|(_, r)| r.score),
                "Quiz submission confirmed"
            );
        } else {
            self.latch.fail();
            tracing::warn!(
                registration_number = %self.registration_number,
                "Quiz submission not confirmed, retry permitted"
            );
        }
    }

    /// Leaves the session without scoring or submitting.
    pub fn abandon(&mut self) -> bool {
        if !self.latch.close() {
            return false;
        }
        self.phase = SessionPhase::Abandoned;
        tracing::info!(
            registration_number = %self.registration_number,
            "Quiz session abandoned"
        );
        true
    }

    /// Score against the current ledger.
    pub fn score(&self) -> u32 {
        ledger::score(&self.questions, &self.ledger)
    }

    pub fn status(&self) -> SessionStatus {
        let attempted = self.ledger.attempted();

        SessionStatus {
            registration_number: self.registration_number.clone(),
            phase: self.phase,
            submission: self.latch,
            total_seconds: self.clock.total(),
            remaining_seconds: self.clock.remaining(),
            attempted,
            unattempted: self.questions.len() - attempted,
            score: self
                .latch
                .is_confirmed()
                .then(|| self.pending.as_ref().map(|(_, r)| r.score))
                .flatten(),
        }
    }

    /// Reuses the previous record unless the ledger changed since.
    fn build_record(&mut self) -> SubmissionRecord {
        let revision = self.ledger.revision();
        if let Some((built_at, record)) = &self.pending {
            if *built_at == revision {
                return record.clone();
            }
        }

        let record = SubmissionRecord {
            registration_number: self.registration_number.clone(),
            answers: self.ledger.answers_for(&self.questions),
            score: self.score(),
        };
        self.pending = Some((revision, record.clone()));
        record
    }
}
