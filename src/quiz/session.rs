//! In-memory store of in-progress quizzes.
//!
//! One entry per account. Starting a quiz overwrites the account's entry;
//! submitting takes it out. Entries expire after the configured TTL.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::{error::AppError, quiz::engine::AnswerKey};

/// Server-held state of a started, not yet submitted quiz.
#[derive(Debug, Clone)]
pub struct ActiveQuiz {
    pub pack_id: i64,
    pub answer_key: HashMap<i64, AnswerKey>,
    pub started_at: Instant,
}

impl ActiveQuiz {
    pub fn new(pack_id: i64, answer_key: HashMap<i64, AnswerKey>) -> Self {
        Self {
            pack_id,
            answer_key,
            started_at: Instant::now(),
        }
    }
}

#[derive(Clone)]
pub struct QuizSessionStore {
    inner: Arc<Mutex<HashMap<i64, ActiveQuiz>>>,
    ttl: Duration,
}

impl QuizSessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, ActiveQuiz>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, quiz: &ActiveQuiz) -> bool {
        quiz.started_at.elapsed() >= self.ttl
    }

    /// Stores `quiz` as the account's only in-progress quiz.
    pub fn start(&self, account_id: i64, quiz: ActiveQuiz) {
        let mut sessions = self.lock();
        sessions.retain(|_, q| !self.is_expired(q));
        if let Some(previous) = sessions.insert(account_id, quiz) {
            tracing::debug!(
                "account {} abandoned quiz on pack {}",
                account_id,
                previous.pack_id
            );
        }
    }

    /// Removes and returns the account's quiz for `pack_id`.
    ///
    /// Check and removal happen under one lock, so of two concurrent callers
    /// exactly one gets the quiz. A quiz for a different pack stays in place.
    pub fn take(&self, account_id: i64, pack_id: i64) -> Result<ActiveQuiz, AppError> {
        let mut sessions = self.lock();

        match sessions.get(&account_id) {
            Some(quiz) if quiz.pack_id == pack_id => {}
            _ => return Err(session_expired()),
        }

        match sessions.remove(&account_id) {
            Some(quiz) if !self.is_expired(&quiz) => Ok(quiz),
            _ => Err(session_expired()),
        }
    }

    /// Drops whatever the account had in progress.
    pub fn clear(&self, account_id: i64) -> bool {
        self.lock().remove(&account_id).is_some()
    }

    pub fn is_active(&self, account_id: i64, pack_id: i64) -> bool {
        self.lock()
            .get(&account_id)
            .is_some_and(|q| q.pack_id == pack_id && !self.is_expired(q))
    }
}

fn session_expired() -> AppError {
    AppError::SessionExpired(
        "Quiz data missing or expired. Please start the quiz again.".to_string(),
    )
}
