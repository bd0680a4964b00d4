// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    backend::{QuizBackend, memory::MemoryBackend},
    config::Config,
    error::AppError,
    session::manager::SessionManager,
    utils::hash::hash_secret,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryBackend>,
    pub sessions: Arc<SessionManager>,
    pub config: Config,
    /// Argon2 hash of `config.admin_secret`, if one was configured.
    pub admin_hash: Option<Arc<str>>,
}

impl AppState {
    /// Wires the session manager to the store and hashes the admin secret.
    pub fn new(config: Config, store: Arc<MemoryBackend>) -> Result<Self, AppError> {
        let backend: Arc<dyn QuizBackend> = store.clone();
        let sessions = Arc::new(SessionManager::new(backend, config.session_settings()));
        let admin_hash = config
            .admin_secret
            .as_deref()
            .map(hash_secret)
            .transpose()?
            .map(Arc::from);

        Ok(Self {
            store,
            sessions,
            config,
            admin_hash,
        })
    }
}

impl FromRef<AppState> for Arc<MemoryBackend> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<SessionManager> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
