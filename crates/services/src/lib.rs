#![forbid(unsafe_code)]

pub mod app_services;
pub mod dataset;
pub mod error;
pub mod quiz;
pub mod timer;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use dataset::{load_questions_csv, parse_questions_csv};
pub use error::{AppServicesError, DatasetError, SessionError};
pub use quiz::{GridCell, QuizProgress, QuizSession, QuizSnapshot, ScoreSummary, SubmitOutcome};
pub use timer::ElapsedTicker;
