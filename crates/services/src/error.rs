//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{QuestionError, QuestionId, QuestionSetError, View};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizSession` actions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("{action} is not available in the {view} view")]
    InvalidTransition { action: &'static str, view: View },
    #[error("unknown question id: {0}")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading the question dataset.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("dataset has no rows")]
    EmptySheet,
    #[error("dataset has no rows with a question id")]
    NoValidRows,
    #[error("row {row}: {source}")]
    InvalidRow {
        row: u64,
        #[source]
        source: QuestionError,
    },
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
