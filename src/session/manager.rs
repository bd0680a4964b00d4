// src/session/manager.rs

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    backend::QuizBackend,
    models::{
        question::PublicQuestion,
        submission::{Answer, SubmissionRecord},
    },
    session::{
        QuizSession, SessionError, SessionStatus, TickOutcome, Trigger,
        sampler::sample_questions,
    },
};

type SharedSession = Arc<Mutex<QuizSession>>;

/// Session parameters taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Session length, in ticks.
    pub duration: u32,
    /// Questions per session.
    pub question_count: usize,
    /// Wall-clock length of one tick.
    pub tick: Duration,
}

/// Returned to the participant when a session starts.
#[derive(Debug, Serialize)]
pub struct StartedSession {
    pub session_id: Uuid,
    pub questions: Vec<PublicQuestion>,
    pub duration_seconds: u32,
}

/// Full view of a live session, for resuming the quiz page.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub status: SessionStatus,
    pub questions: Vec<PublicQuestion>,
    pub answers: Vec<Answer>,
}

/// Outcome of a submit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Submitted { score: u32, total_questions: usize },
    /// Another trigger already owns the submission.
    Ignored,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, SharedSession>,
    by_participant: HashMap<String, Uuid>,
    /// Participants who gave up their attempt. Survives purges.
    abandoned: HashSet<String>,
}

/// Owns the live sessions and drives their clocks.
pub struct SessionManager {
    backend: Arc<dyn QuizBackend>,
    settings: SessionSettings,
    registry: RwLock<Registry>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn QuizBackend>, settings: SessionSettings) -> Self {
        Self {
            backend,
            settings,
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Samples questions for a registered participant and starts the clock.
    pub async fn start_session(
        &self,
        registration_number: &str,
    ) -> Result<StartedSession, SessionError> {
        let participant = self.backend.get_participant(registration_number).await?;
        if self.backend.has_submitted(&participant.registration_number).await? {
            return Err(SessionError::AlreadySubmitted);
        }
        self.ensure_no_live_session(&participant.registration_number)
            .await?;

        let bank = self.backend.fetch_question_bank().await?;
        let sampled = {
            let mut rng = rand::rng();
            sample_questions(&bank, self.settings.question_count, &mut rng)?
        };

        let mut session = QuizSession::new(
            participant.registration_number.clone(),
            sampled,
            self.settings.duration,
        )?;
        let questions = session.public_questions();
        let session_id = Uuid::new_v4();

        let shared = {
            let mut registry = self.registry.write().await;
            if registry.abandoned.contains(&participant.registration_number) {
                return Err(SessionError::Abandoned(participant.registration_number));
            }
            // Re-check under the write lock; another start may have raced us.
            if let Some(existing) = registry.by_participant.get(&participant.registration_number) {
                if let Some(other) = registry.sessions.get(existing) {
                    if !other.lock().await.is_finished() {
                        return Err(SessionError::AlreadyActive(
                            participant.registration_number,
                        ));
                    }
                }
            }

            session.start()?;
            let shared = Arc::new(Mutex::new(session));
            registry.sessions.insert(session_id, shared.clone());
            registry
                .by_participant
                .insert(participant.registration_number.clone(), session_id);
            shared
        };

        self.spawn_ticker(session_id, shared);

        Ok(StartedSession {
            session_id,
            questions,
            duration_seconds: self.settings.duration,
        })
    }

    pub async fn view(&self, session_id: Uuid) -> Result<SessionView, SessionError> {
        let shared = self.get(session_id).await?;
        let session = shared.lock().await;
        Ok(SessionView {
            session_id,
            status: session.status(),
            questions: session.public_questions(),
            answers: session.answers(),
        })
    }

    pub async fn status(&self, session_id: Uuid) -> Result<SessionStatus, SessionError> {
        let shared = self.get(session_id).await?;
        let status = shared.lock().await.status();
        Ok(status)
    }

    pub async fn record_answer(
        &self,
        session_id: Uuid,
        question_id: u64,
        answer: String,
    ) -> Result<(), SessionError> {
        let shared = self.get(session_id).await?;
        let mut session = shared.lock().await;
        session.record(question_id, answer)
    }

    /// Manual submission. A trigger that loses to another (the clock, a
    /// double click) yields `SubmitOutcome::Ignored`.
    pub async fn submit(&self, session_id: Uuid) -> Result<SubmitOutcome, SessionError> {
        let shared = self.get(session_id).await?;

        let record = shared.lock().await.finalize(Trigger::Manual);

        match record {
            Some(record) => deliver(self.backend.as_ref(), &shared, record).await,
            None => Ok(SubmitOutcome::Ignored),
        }
    }

    /// Ends the session without scoring. The participant cannot start
    /// another one. Returns `false` when a submission is already running or
    /// done.
    pub async fn abandon(&self, session_id: Uuid) -> Result<bool, SessionError> {
        let mut registry = self.registry.write().await;
        let shared = registry
            .sessions
            .get(&session_id)
            .cloned()
            .ok_or(SessionError::NotFound)?;

        let mut session = shared.lock().await;
        if !session.abandon() {
            return Ok(false);
        }
        registry
            .abandoned
            .insert(session.registration_number().to_string());
        Ok(true)
    }

    /// Drops confirmed and abandoned sessions. Returns how many were removed.
    pub async fn purge_finished(&self) -> usize {
        let mut registry = self.registry.write().await;
        let mut finished = Vec::new();
        for (id, shared) in &registry.sessions {
            if shared.lock().await.is_finished() {
                finished.push(*id);
            }
        }

        for id in &finished {
            registry.sessions.remove(id);
        }
        registry
            .by_participant
            .retain(|_, id| !finished.contains(id));

        if !finished.is_empty() {
            tracing::debug!(count = finished.len(), "Purged finished sessions");
        }
        finished.len()
    }

    async fn get(&self, session_id: Uuid) -> Result<SharedSession, SessionError> {
        self.registry
            .read()
            .await
            .sessions
            .get(&session_id)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    async fn ensure_no_live_session(&self, registration_number: &str) -> Result<(), SessionError> {
        let existing = {
            let registry = self.registry.read().await;
            if registry.abandoned.contains(registration_number) {
                return Err(SessionError::Abandoned(registration_number.to_string()));
            }
            registry
                .by_participant
                .get(registration_number)
                .and_then(|id| registry.sessions.get(id))
                .cloned()
        };

        if let Some(shared) = existing {
            if !shared.lock().await.is_finished() {
                return Err(SessionError::AlreadyActive(registration_number.to_string()));
            }
        }
        Ok(())
    }

    /// One ticker per session; it ends as soon as the session leaves
    /// `Running`. On expiry it delivers through the same path as `submit`.
    fn spawn_ticker(&self, session_id: Uuid, shared: SharedSession) {
        let backend = self.backend.clone();
        let period = self.settings.tick;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let outcome = shared.lock().await.tick();
                match outcome {
                    TickOutcome::Running(_) => continue,
                    TickOutcome::Expired(Some(record)) => {
                        if let Err(e) = deliver(backend.as_ref(), &shared, record).await {
                            tracing::warn!(%session_id, "Auto-submit failed: {}", e);
                        }
                        break;
                    }
                    TickOutcome::Expired(None) | TickOutcome::Stopped => break,
                }
            }
            tracing::debug!(%session_id, "Session ticker stopped");
        });
    }
}

/// Sends a finalized record to the backend and settles the latch.
/// The session lock is not held across the backend call.
async fn deliver(
    backend: &dyn QuizBackend,
    shared: &SharedSession,
    record: SubmissionRecord,
) -> Result<SubmitOutcome, SessionError> {
    let result = backend
        .submit_attempt(&record.registration_number, &record.answers, record.score)
        .await;

    shared.lock().await.complete(result.is_ok());

    match result {
        Ok(()) => Ok(SubmitOutcome::Submitted {
            score: record.score,
            total_questions: record.answers.len(),
        }),
        Err(e) => {
            tracing::warn!(
                registration_number = %record.registration_number,
                "Submission rejected by backend: {}",
                e
            );
            Err(SessionError::SubmissionFailed(e.to_string()))
        }
    }
}
