use std::collections::HashMap;

use crate::model::{QuestionId, QuestionSet};

/// The user's current answers, keyed by question id.
///
/// A missing entry and an empty string both mean "unanswered".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: HashMap<QuestionId, String>,
}

impl AnswerSheet {
    /// An all-empty sheet with one entry per question.
    #[must_use]
    pub fn blank(questions: &QuestionSet) -> Self {
        questions
            .iter()
            .map(|q| (q.id().clone(), String::new()))
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> &str {
        self.answers.get(id).map_or("", String::as_str)
    }

    pub fn set(&mut self, id: QuestionId, answer: impl Into<String>) {
        self.answers.insert(id, answer.into());
    }

    #[must_use]
    pub fn is_answered(&self, id: &QuestionId) -> bool {
        !self.get(id).trim().is_empty()
    }

    /// Number of questions in `questions` with a non-blank answer.
    #[must_use]
    pub fn answered_count(&self, questions: &QuestionSet) -> usize {
        questions.iter().filter(|q| self.is_answered(q.id())).count()
    }

    #[must_use]
    pub fn unanswered_count(&self, questions: &QuestionSet) -> usize {
        questions.len() - self.answered_count(questions)
    }

    /// Reset every entry to empty, keeping the keys.
    pub fn clear(&mut self) {
        for answer in self.answers.values_mut() {
            answer.clear();
        }
    }
}

impl FromIterator<(QuestionId, String)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, String)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionType};

    fn set_of(ids: &[&str]) -> QuestionSet {
        QuestionSet::new(
            ids.iter()
                .map(|id| {
                    Question::new(QuestionId::new(*id).unwrap(), QuestionType::FillInBlank, "x")
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn whitespace_only_counts_as_unanswered() {
        let questions = set_of(&["a", "b", "c"]);
        let mut sheet = AnswerSheet::blank(&questions);
        sheet.set(QuestionId::new("a").unwrap(), "B");
        sheet.set(QuestionId::new("b").unwrap(), "   ");

        assert_eq!(sheet.answered_count(&questions), 1);
        assert_eq!(sheet.unanswered_count(&questions), 2);
    }

    #[test]
    fn clear_keeps_keys() {
        let questions = set_of(&["a"]);
        let mut sheet = AnswerSheet::blank(&questions);
        sheet.set(QuestionId::new("a").unwrap(), "text");
        sheet.clear();
        assert_eq!(sheet, AnswerSheet::blank(&questions));
    }
}
