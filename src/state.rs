use std::time::Duration;

use crate::config::Config;
use crate::quiz::session::QuizSessionStore;
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub quiz_sessions: QuizSessionStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let quiz_sessions = QuizSessionStore::new(Duration::from_secs(config.quiz_session_ttl));
        Self {
            pool,
            config,
            quiz_sessions,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuizSessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.quiz_sessions.clone()
    }
}
