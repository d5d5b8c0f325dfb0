use async_trait::async_trait;
use quiz_core::model::{AnswerSheet, QuestionId, SessionMeta};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Per-question answer text, keyed by question id.
///
/// Unknown ids read as the empty string (unanswered).
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Fetch one answer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_answer(&self, id: &QuestionId) -> Result<String, StorageError>;

    /// Persist one answer, replacing the previous text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the answer cannot be stored.
    async fn set_answer(&self, id: &QuestionId, answer: &str) -> Result<(), StorageError>;

    /// Fetch the answers for the given ids in one go.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_answers(&self, ids: &[QuestionId]) -> Result<AnswerSheet, StorageError>;

    /// Create an empty entry for every id that has none yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if entries cannot be created.
    async fn ensure_answers(&self, ids: &[QuestionId]) -> Result<(), StorageError>;

    /// Reset the answer of every given id to empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the reset cannot be stored.
    async fn clear_all(&self, ids: &[QuestionId]) -> Result<(), StorageError>;
}

/// The single session metadata record.
#[async_trait]
pub trait SessionMetaRepository: Send + Sync {
    /// Load the record. A missing or unreadable record yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn load_meta(&self) -> Result<SessionMeta, StorageError>;

    /// Overwrite the whole record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_meta(&self, meta: &SessionMeta) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    answers: Arc<Mutex<HashMap<QuestionId, String>>>,
    meta: Arc<Mutex<Option<SessionMeta>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn get_answer(&self, id: &QuestionId) -> Result<String, StorageError> {
        let guard = self.answers.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned().unwrap_or_default())
    }

    async fn set_answer(&self, id: &QuestionId, answer: &str) -> Result<(), StorageError> {
        let mut guard = self.answers.lock().map_err(poisoned)?;
        guard.insert(id.clone(), answer.to_owned());
        Ok(())
    }

    async fn get_answers(&self, ids: &[QuestionId]) -> Result<AnswerSheet, StorageError> {
        let guard = self.answers.lock().map_err(poisoned)?;
        Ok(ids
            .iter()
            .map(|id| (id.clone(), guard.get(id).cloned().unwrap_or_default()))
            .collect())
    }

    async fn ensure_answers(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        let mut guard = self.answers.lock().map_err(poisoned)?;
        for id in ids {
            guard.entry(id.clone()).or_default();
        }
        Ok(())
    }

    async fn clear_all(&self, ids: &[QuestionId]) -> Result<(), StorageError> {
        let mut guard = self.answers.lock().map_err(poisoned)?;
        for id in ids {
            guard.insert(id.clone(), String::new());
        }
        Ok(())
    }
}

#[async_trait]
impl SessionMetaRepository for InMemoryRepository {
    async fn load_meta(&self) -> Result<SessionMeta, StorageError> {
        let guard = self.meta.lock().map_err(poisoned)?;
        Ok(guard.clone().unwrap_or_default())
    }

    async fn save_meta(&self, meta: &SessionMeta) -> Result<(), StorageError> {
        let mut guard = self.meta.lock().map_err(poisoned)?;
        *guard = Some(meta.clone());
        Ok(())
    }
}

/// Aggregates the answer and metadata stores behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub answers: Arc<dyn AnswerRepository>,
    pub meta: Arc<dyn SessionMetaRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repo(InMemoryRepository::new())
    }

    /// Use one repository value for both stores.
    #[must_use]
    pub fn from_repo<R>(repo: R) -> Self
    where
        R: AnswerRepository + SessionMetaRepository + Clone + 'static,
    {
        let answers: Arc<dyn AnswerRepository> = Arc::new(repo.clone());
        let meta: Arc<dyn SessionMetaRepository> = Arc::new(repo);
        Self { answers, meta }
    }
}
