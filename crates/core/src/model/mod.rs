mod answer;
mod ids;
mod meta;
mod question;
mod question_set;

pub use answer::AnswerSheet;
pub use ids::QuestionId;
pub use meta::{MetaPatch, SessionMeta, View, ViewParseError};
pub use question::{Question, QuestionError, QuestionType};
pub use question_set::{QuestionSet, QuestionSetError};
