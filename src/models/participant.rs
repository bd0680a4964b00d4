// src/models/participant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A registered competition participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,

    /// Unique per participant; identifies the attempt towards the backend.
    pub registration_number: String,

    /// Must be on the whitelist at registration time.
    pub email: String,

    pub college: String,

    pub registered_at: DateTime<Utc>,
}

/// DTO for participant registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterParticipantRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Registration number length must be between 1 and 50 characters."
    ))]
    pub registration_number: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub college: String,
}

/// DTO for adding an email to the whitelist.
#[derive(Debug, Deserialize, Validate)]
pub struct WhitelistRequest {
    #[validate(email)]
    pub email: String,
}

/// Query for the public whitelist check.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Substring search used by the admin list views.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    /// Lowercased, trimmed needle; `None` when there is nothing to filter by.
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }
}

/// Registration numbers are stored and looked up without surrounding whitespace.
pub fn normalize_registration_number(registration_number: &str) -> &str {
    registration_number.trim()
}

/// Whitelist entries are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
