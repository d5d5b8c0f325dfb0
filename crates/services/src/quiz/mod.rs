mod progress;
mod service;
mod snapshot;

// Public API of the quiz session subsystem.
pub use crate::error::SessionError;
pub use progress::QuizProgress;
pub use service::{QuizSession, SubmitOutcome};
pub use snapshot::{GridCell, QuizSnapshot, ScoreSummary};
