//! Answer checking and score aggregation.
//!
//! Everything here is a pure function of the question set and the answer
//! sheet; callers recompute on demand instead of keeping running totals.

use crate::model::{AnswerSheet, Question, QuestionSet, QuestionType};

/// Whether `user_answer` matches the canonical answer of `question`.
///
/// Blank answers are never correct. Multiple-choice answers compare trimmed
/// and upper-cased; fill-in-blank answers compare trimmed, case-sensitive.
#[must_use]
pub fn is_correct(question: &Question, user_answer: &str) -> bool {
    let given = user_answer.trim();
    if given.is_empty() {
        return false;
    }
    let expected = question.answer().trim();
    match question.question_type() {
        QuestionType::MultipleChoice => given.to_uppercase() == expected.to_uppercase(),
        QuestionType::FillInBlank => given == expected,
    }
}

/// Grid cell classification for the result view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridStatus {
    Unanswered,
    Correct,
    Wrong,
}

impl GridStatus {
    #[must_use]
    pub fn classify(question: &Question, user_answer: &str) -> Self {
        if user_answer.trim().is_empty() {
            GridStatus::Unanswered
        } else if is_correct(question, user_answer) {
            GridStatus::Correct
        } else {
            GridStatus::Wrong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    #[must_use]
    pub fn compute(questions: &QuestionSet, answers: &AnswerSheet) -> Self {
        let correct = questions
            .iter()
            .filter(|q| is_correct(q, answers.get(q.id())))
            .count();
        Self {
            correct,
            total: questions.len(),
        }
    }

    /// Percentage with one decimal place, `0.0` for an empty quiz.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let ratio = self.correct as f64 / self.total as f64;
        (ratio * 1000.0).round() / 10.0
    }
}

/// Per-question status in dataset order.
#[must_use]
pub fn grid(questions: &QuestionSet, answers: &AnswerSheet) -> Vec<GridStatus> {
    questions
        .iter()
        .map(|q| GridStatus::classify(q, answers.get(q.id())))
        .collect()
}
