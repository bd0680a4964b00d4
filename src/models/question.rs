// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kind of a quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    /// Multiple choice; the participant picks one of `options`.
    #[serde(rename = "mcq")]
    Mcq,
    /// Free text answer.
    #[serde(rename = "shortAnswer")]
    ShortAnswer,
}

/// A question from the bank.
/// Immutable once it has been handed to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable for the lifetime of the bank.
    pub id: u64,

    /// Subject tag (e.g., "Physics").
    pub subject: String,

    /// The text shown to the participant.
    pub text: String,

    pub question_type: QuestionType,

    /// The expected answer. For MCQ this is normally one of `options`,
    /// but scoring never checks that.
    pub correct_answer: String,

    /// Present only for multiple choice questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Competition round the question belongs to.
    pub round: u32,
}

/// DTO for sending a question to a participant (excludes the correct answer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: u64,
    pub subject: String,
    pub text: String,
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub round: u32,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            subject: q.subject.clone(),
            text: q.text.clone(),
            question_type: q.question_type,
            options: q.options.clone(),
            round: q.round,
        }
    }
}

/// DTO for creating or replacing a question.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = validate_question_shape))]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    pub question_type: QuestionType,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    pub options: Option<Vec<String>>,
    #[validate(range(min = 1, max = 100))]
    pub round: u32,
}

impl QuestionRequest {
    /// Builds the bank entry. Blank options are dropped and short answer
    /// questions never carry options.
    pub fn into_question(self, id: u64) -> Question {
        let options = match self.question_type {
            QuestionType::Mcq => self.options.map(|opts| {
                opts.into_iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            }),
            QuestionType::ShortAnswer => None,
        };

        Question {
            id,
            subject: self.subject.trim().to_string(),
            text: self.text,
            question_type: self.question_type,
            correct_answer: self.correct_answer.trim().to_string(),
            options,
            round: self.round,
        }
    }
}

/// MCQ questions need at least two non-blank options.
fn validate_question_shape(req: &QuestionRequest) -> Result<(), validator::ValidationError> {
    if req.question_type != QuestionType::Mcq {
        return Ok(());
    }

    let filled = req
        .options
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|o| !o.trim().is_empty())
        .count();

    if filled < 2 {
        return Err(validator::ValidationError::new("mcq_needs_two_options"));
    }
    if req.options.iter().flatten().any(|o| o.len() > 500) {
        return Err(validator::ValidationError::new("option_too_long"));
    }
    Ok(())
}

/// Query filters for listing questions.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionFilter {
    pub round: Option<u32>,
    pub subject: Option<String>,
}

impl QuestionFilter {
    pub fn matches(&self, q: &Question) -> bool {
        self.round.is_none_or(|r| q.round == r)
            && self.subject.as_deref().is_none_or(|s| q.subject == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq_request(options: Vec<&str>) -> QuestionRequest {
        QuestionRequest {
            subject: "Geography".to_string(),
            text: "Capital of France?".to_string(),
            question_type: QuestionType::Mcq,
            correct_answer: "Paris".to_string(),
            options: Some(options.into_iter().map(String::from).collect()),
            round: 1,
        }
    }

    #[test]
    fn mcq_with_one_real_option_is_rejected() {
        let req = mcq_request(vec!["Paris", "  ", ""]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn mcq_drops_blank_options() {
        let req = mcq_request(vec!["Paris", " ", "Lyon "]);
        assert!(req.validate().is_ok());

        let q = req.into_question(7);
        assert_eq!(q.id, 7);
        assert_eq!(
            q.options,
            Some(vec!["Paris".to_string(), "Lyon".to_string()])
        );
    }

    #[test]
    fn short_answer_never_keeps_options() {
        let mut req = mcq_request(vec!["a", "b"]);
        req.question_type = QuestionType::ShortAnswer;
        assert!(req.validate().is_ok());
        assert_eq!(req.into_question(1).options, None);
    }

    #[test]
    fn question_type_uses_wire_names() {
        let json = serde_json::to_string(&QuestionType::ShortAnswer).unwrap();
        assert_eq!(json, "\"shortAnswer\"");
        let parsed: QuestionType = serde_json::from_str("\"mcq\"").unwrap();
        assert_eq!(parsed, QuestionType::Mcq);
    }
}
