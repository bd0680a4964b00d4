// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{participant::Participant, question::Question};

/// One (question, answer text) pair of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: u64,
    /// Empty when the question was left unanswered.
    pub answer: String,
}

/// The terminal artifact of a session, handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub registration_number: String,
    /// One entry per sampled question, in presentation order.
    pub answers: Vec<Answer>,
    pub score: u32,
}

/// A submission as stored by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub participant: Participant,
    pub answers: Vec<Answer>,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Row of the public leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub registration_number: String,
    pub college: String,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Results view for a participant: score plus the questions they were asked.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedResults {
    pub score: u32,
    pub total_questions: usize,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}

/// Participant joined with their score for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantWithScore {
    #[serde(flatten)]
    pub participant: Participant,
    pub score: Option<u32>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Flat row for the CSV export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub name: String,
    pub registration_number: String,
    pub email: String,
    pub college: String,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}
