use std::path::Path;
use std::sync::Arc;

use quiz_core::model::QuestionSet;
use storage::repository::Storage;

use crate::Clock;
use crate::dataset::load_questions_csv;
use crate::error::AppServicesError;
use crate::quiz::QuizSession;

/// Assembles the loaded dataset, storage backend and clock for the app.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    questions: Arc<QuestionSet>,
    storage: Storage,
}

impl AppServices {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<QuestionSet>, storage: Storage) -> Self {
        Self {
            clock,
            questions,
            storage,
        }
    }

    /// Load the dataset and open `SQLite` storage.
    ///
    /// The dataset is loaded first; a load failure is terminal and no storage
    /// is touched.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the dataset cannot be loaded or storage
    /// initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        dataset: &Path,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let questions = Arc::new(load_questions_csv(dataset)?);
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(clock, questions, storage))
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionSet> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Initialize the quiz session against the stored progress.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Session` if the stores cannot be read.
    pub async fn open_session(&self) -> Result<QuizSession, AppServicesError> {
        Ok(QuizSession::initialize(Arc::clone(&self.questions), self.clock, &self.storage).await?)
    }
}
