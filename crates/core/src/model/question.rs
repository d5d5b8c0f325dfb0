use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
}

impl FromStr for QuestionType {
    type Err = QuestionError;

    /// Parses the labels used in question sheets. Separators and case are ignored,
    /// so `Multiple Choice`, `multiple-choice` and `MC` all map to the same type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "multiplechoice" | "mc" | "choice" | "mcq" => Ok(QuestionType::MultipleChoice),
            "fillinblank" | "fillintheblank" | "fillblank" | "fib" | "blank" => {
                Ok(QuestionType::FillInBlank)
            }
            _ => Err(QuestionError::UnknownType(s.trim().to_owned())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("unknown question type: {0:?}")]
    UnknownType(String),
}

/// A single immutable question loaded from the dataset.
///
/// `ch_question` and `ch_options` carry the optional second-language rendering
/// of the prompt and options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    question: Option<String>,
    ch_question: Option<String>,
    question_type: QuestionType,
    options: Vec<String>,
    ch_options: Vec<String>,
    answer: String,
    image: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, question_type: QuestionType, answer: impl Into<String>) -> Self {
        Self {
            id,
            question: None,
            ch_question: None,
            question_type,
            options: Vec::new(),
            ch_options: Vec::new(),
            answer: answer.into(),
            image: None,
        }
    }

    #[must_use]
    pub fn with_question(mut self, text: impl Into<String>) -> Self {
        self.question = non_blank(text.into());
        self
    }

    #[must_use]
    pub fn with_ch_question(mut self, text: impl Into<String>) -> Self {
        self.ch_question = non_blank(text.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_ch_options(mut self, options: Vec<String>) -> Self {
        self.ch_options = options;
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = non_blank(image.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    #[must_use]
    pub fn ch_question(&self) -> Option<&str> {
        self.ch_question.as_deref()
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn ch_options(&self) -> &[String] {
        &self.ch_options
    }

    /// The canonical correct answer.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
