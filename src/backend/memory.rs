// src/backend/memory.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    backend::{BackendError, QuizBackend},
    models::{
        participant::{
            Participant, RegisterParticipantRequest, normalize_email,
            normalize_registration_number,
        },
        question::{Question, QuestionFilter, QuestionRequest},
        submission::{
            Answer, DetailedResults, ExportRow, LeaderboardEntry, ParticipantWithScore,
            Submission,
        },
    },
};

#[derive(Debug, Default)]
struct Store {
    /// Keyed by id, which also gives the bank order.
    questions: BTreeMap<u64, Question>,
    next_question_id: u64,
    whitelist: BTreeSet<String>,
    participants: HashMap<String, Participant>,
    submissions: HashMap<String, Submission>,
}

/// Distinct filter values over the bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionFacets {
    pub rounds: Vec<u32>,
    pub subjects: Vec<String>,
}

/// Initial content loaded at startup.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub questions: Vec<QuestionRequest>,
    #[serde(default)]
    pub whitelist: Vec<String>,
}

/// Process-local backend. Holds everything in memory behind one lock.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: RwLock<Store>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads seed questions and whitelist entries. Invalid questions are
    /// skipped with a warning; duplicate emails collapse.
    pub async fn seed(&self, data: SeedData) {
        let mut store = self.store.write().await;
        for req in data.questions {
            if let Err(e) = req.validate() {
                tracing::warn!("Skipping invalid seed question: {}", e);
                continue;
            }
            store.next_question_id += 1;
            let id = store.next_question_id;
            store.questions.insert(id, req.into_question(id));
        }
        for email in data.whitelist {
            store.whitelist.insert(normalize_email(&email));
        }
        tracing::info!(
            questions = store.questions.len(),
            whitelist = store.whitelist.len(),
            "Seed data loaded"
        );
    }

    // Questions

    pub async fn list_questions(&self, filter: &QuestionFilter) -> Vec<Question> {
        let store = self.store.read().await;
        store
            .questions
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect()
    }

    pub async fn get_question(&self, id: u64) -> Result<Question, BackendError> {
        let store = self.store.read().await;
        store
            .questions
            .get(&id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Question not found".to_string()))
    }

    pub async fn add_question(&self, req: QuestionRequest) -> Question {
        let mut store = self.store.write().await;
        store.next_question_id += 1;
        let id = store.next_question_id;
        let question = req.into_question(id);
        store.questions.insert(id, question.clone());
        question
    }

    pub async fn update_question(
        &self,
        id: u64,
        req: QuestionRequest,
    ) -> Result<Question, BackendError> {
        let mut store = self.store.write().await;
        let slot = store
            .questions
            .get_mut(&id)
            .ok_or_else(|| BackendError::NotFound("Question not found".to_string()))?;
        *slot = req.into_question(id);
        Ok(slot.clone())
    }

    pub async fn delete_question(&self, id: u64) -> Result<(), BackendError> {
        let mut store = self.store.write().await;
        store
            .questions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound("Question not found".to_string()))
    }

    /// Distinct rounds and subjects, sorted, for the admin filters.
    pub async fn question_facets(&self) -> QuestionFacets {
        let store = self.store.read().await;
        let rounds: BTreeSet<u32> = store.questions.values().map(|q| q.round).collect();
        let subjects: BTreeSet<String> =
            store.questions.values().map(|q| q.subject.clone()).collect();
        QuestionFacets {
            rounds: rounds.into_iter().collect(),
            subjects: subjects.into_iter().collect(),
        }
    }

    // Whitelist

    pub async fn list_whitelist(&self, needle: Option<&str>) -> Vec<String> {
        let store = self.store.read().await;
        store
            .whitelist
            .iter()
            .filter(|e| needle.is_none_or(|n| e.contains(n)))
            .cloned()
            .collect()
    }

    pub async fn add_whitelisted_email(&self, email: &str) -> Result<String, BackendError> {
        let email = normalize_email(email);
        let mut store = self.store.write().await;
        if !store.whitelist.insert(email.clone()) {
            return Err(BackendError::Conflict(format!(
                "Email '{}' is already whitelisted",
                email
            )));
        }
        Ok(email)
    }

    pub async fn remove_whitelisted_email(&self, email: &str) -> Result<(), BackendError> {
        let mut store = self.store.write().await;
        if !store.whitelist.remove(&normalize_email(email)) {
            return Err(BackendError::NotFound("Email not whitelisted".to_string()));
        }
        Ok(())
    }

    pub async fn is_email_whitelisted(&self, email: &str) -> bool {
        self.store
            .read()
            .await
            .whitelist
            .contains(&normalize_email(email))
    }

    // Participants

    /// Registers a participant whose email is on the whitelist.
    pub async fn register_participant(
        &self,
        req: RegisterParticipantRequest,
    ) -> Result<Participant, BackendError> {
        let mut store = self.store.write().await;

        let email = normalize_email(&req.email);
        if !store.whitelist.contains(&email) {
            return Err(BackendError::Forbidden(
                "Your email is not approved for this quiz. Contact admin.".to_string(),
            ));
        }

        let registration_number = normalize_registration_number(&req.registration_number).to_string();
        if store.participants.contains_key(&registration_number) {
            return Err(BackendError::Conflict(format!(
                "Registration number '{}' already exists",
                registration_number
            )));
        }

        let participant = Participant {
            name: req.name.trim().to_string(),
            registration_number: registration_number.clone(),
            email,
            college: req.college.trim().to_string(),
            registered_at: Utc::now(),
        };
        store
            .participants
            .insert(registration_number, participant.clone());

        Ok(participant)
    }

    /// Participants joined with their scores, best first; unsubmitted last.
    pub async fn list_participants(&self, needle: Option<&str>) -> Vec<ParticipantWithScore> {
        let store = self.store.read().await;
        let mut rows: Vec<ParticipantWithScore> = store
            .participants
            .values()
            .filter(|p| {
                needle.is_none_or(|n| {
                    p.name.to_lowercase().contains(n)
                        || p.registration_number.to_lowercase().contains(n)
                })
            })
            .map(|p| {
                let submission = store.submissions.get(&p.registration_number);
                ParticipantWithScore {
                    participant: p.clone(),
                    score: submission.map(|s| s.score),
                    submitted_at: submission.map(|s| s.submitted_at),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.participant.registered_at.cmp(&b.participant.registered_at))
        });
        rows
    }

    // Results

    pub async fn participant_results(
        &self,
        registration_number: &str,
    ) -> Result<Submission, BackendError> {
        let registration_number = normalize_registration_number(registration_number);
        let store = self.store.read().await;
        store
            .submissions
            .get(registration_number)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Results not found".to_string()))
    }

    /// Score plus the questions that were answered, in answer order.
    /// Questions deleted since the attempt are left out.
    pub async fn detailed_results(
        &self,
        registration_number: &str,
    ) -> Result<DetailedResults, BackendError> {
        let registration_number = normalize_registration_number(registration_number);
        let store = self.store.read().await;
        let submission = store
            .submissions
            .get(registration_number)
            .ok_or_else(|| BackendError::NotFound("Results not found".to_string()))?;

        let questions = submission
            .answers
            .iter()
            .filter_map(|a| store.questions.get(&a.question_id).cloned())
            .collect();

        Ok(DetailedResults {
            score: submission.score,
            total_questions: submission.answers.len(),
            questions,
            answers: submission.answers.clone(),
        })
    }

    /// Top submissions by score, earliest submission first on ties.
    pub async fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let store = self.store.read().await;
        let mut submissions: Vec<&Submission> = store.submissions.values().collect();
        submissions.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        });

        submissions
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, s)| LeaderboardEntry {
                rank: i + 1,
                name: s.participant.name.clone(),
                registration_number: s.participant.registration_number.clone(),
                college: s.participant.college.clone(),
                score: s.score,
                submitted_at: s.submitted_at,
            })
            .collect()
    }

    /// Rows for the CSV export, in leaderboard order.
    pub async fn export_rows(&self) -> Vec<ExportRow> {
        let store = self.store.read().await;
        let mut rows: Vec<ExportRow> = store
            .submissions
            .values()
            .map(|s| ExportRow {
                name: s.participant.name.clone(),
                registration_number: s.participant.registration_number.clone(),
                email: s.participant.email.clone(),
                college: s.participant.college.clone(),
                score: s.score,
                submitted_at: s.submitted_at,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        });
        rows
    }
}

#[async_trait]
impl QuizBackend for MemoryBackend {
    async fn fetch_question_bank(&self) -> Result<Vec<Question>, BackendError> {
        Ok(self.store.read().await.questions.values().cloned().collect())
    }

    async fn submit_attempt(
        &self,
        registration_number: &str,
        answers: &[Answer],
        score: u32,
    ) -> Result<(), BackendError> {
        let registration_number = normalize_registration_number(registration_number);
        let mut store = self.store.write().await;

        let participant = store
            .participants
            .get(registration_number)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Participant not found".to_string()))?;

        if store.submissions.contains_key(registration_number) {
            return Err(BackendError::Conflict(
                "Quiz already submitted for this registration number".to_string(),
            ));
        }

        store.submissions.insert(
            registration_number.to_string(),
            Submission {
                participant,
                answers: answers.to_vec(),
                score,
                submitted_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_participant(&self, registration_number: &str) -> Result<Participant, BackendError> {
        let registration_number = normalize_registration_number(registration_number);
        let store = self.store.read().await;
        store
            .participants
            .get(registration_number)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("Participant not found".to_string()))
    }

    async fn has_submitted(&self, registration_number: &str) -> Result<bool, BackendError> {
        let registration_number = normalize_registration_number(registration_number);
        Ok(self
            .store
            .read()
            .await
            .submissions
            .contains_key(registration_number))
    }
}
