use quiz_core::model::{AnswerSheet, QuestionSet};

/// Aggregated answer progress, useful for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

impl QuizProgress {
    #[must_use]
    pub fn compute(questions: &QuestionSet, answers: &AnswerSheet) -> Self {
        let answered = answers.answered_count(questions);
        Self {
            total: questions.len(),
            answered,
            remaining: questions.len() - answered,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionId, QuestionType};

    #[test]
    fn complete_only_when_nothing_remains() {
        let id = |raw: &str| QuestionId::new(raw).unwrap();
        let questions = QuestionSet::new(vec![
            Question::new(id("a"), QuestionType::FillInBlank, "x"),
            Question::new(id("b"), QuestionType::FillInBlank, "y"),
        ])
        .unwrap();
        let mut answers = AnswerSheet::blank(&questions);
        answers.set(id("a"), "x");

        let progress = QuizProgress::compute(&questions, &answers);
        assert_eq!((progress.answered, progress.remaining), (1, 1));
        assert!(!progress.is_complete());

        answers.set(id("b"), " ");
        assert!(!QuizProgress::compute(&questions, &answers).is_complete());
        answers.set(id("b"), "y");
        assert!(QuizProgress::compute(&questions, &answers).is_complete());
    }
}
