// src/config.rs

use std::{env, str::FromStr, time::Duration};

use dotenvy::dotenv;

use crate::session::manager::SessionSettings;

pub const DEFAULT_QUIZ_DURATION_SECS: u32 = 30 * 60;
pub const DEFAULT_QUESTION_COUNT: usize = 20;
pub const DEFAULT_TICK_MILLIS: u64 = 1000;
pub const LEADERBOARD_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    /// Plain admin secret. Hashed at startup; admin login is disabled when unset.
    pub admin_secret: Option<String>,
    pub rust_log: String,
    pub port: u16,
    /// Optional JSON file with initial questions and whitelist.
    pub seed_file: Option<String>,
    pub quiz_duration_secs: u32,
    pub question_count: usize,
    pub tick_millis: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", 3600),
            admin_secret: env::var("ADMIN_SECRET").ok().filter(|s| !s.is_empty()),
            rust_log,
            port: parse_or("PORT", 3000),
            seed_file: env::var("SEED_FILE").ok().filter(|s| !s.is_empty()),
            // A zero-length quiz would never tick.
            quiz_duration_secs: parse_or("QUIZ_DURATION_SECS", DEFAULT_QUIZ_DURATION_SECS).max(1),
            question_count: parse_or("QUIZ_QUESTION_COUNT", DEFAULT_QUESTION_COUNT).max(1),
            tick_millis: parse_or("QUIZ_TICK_MILLIS", DEFAULT_TICK_MILLIS).max(1),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            duration: self.quiz_duration_secs,
            question_count: self.question_count,
            tick: Duration::from_millis(self.tick_millis),
        }
    }
}

/// Reads an optional variable, falling back to `default` when it is unset
/// or does not parse.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
