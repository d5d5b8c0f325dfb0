use std::collections::HashMap;
use thiserror::Error;

use crate::model::{Question, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set is empty")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),
}

/// The ordered, non-empty list of questions for one quiz.
///
/// Order is the dataset order and defines navigation and "first question"
/// fallbacks. Ids are unique.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
}

impl QuestionSet {
    /// Build a set from loaded questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Empty` for an empty list and
    /// `QuestionSetError::DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }

        let mut index = HashMap::with_capacity(questions.len());
        for (pos, question) in questions.iter().enumerate() {
            if index.insert(question.id().clone(), pos).is_some() {
                return Err(QuestionSetError::DuplicateId(question.id().clone()));
            }
        }

        Ok(Self { questions, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> &Question {
        &self.questions[0]
    }

    #[must_use]
    pub fn first_id(&self) -> &QuestionId {
        self.first().id()
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.position(id).map(|pos| &self.questions[pos])
    }

    #[must_use]
    pub fn at(&self, pos: usize) -> Option<&Question> {
        self.questions.get(pos)
    }

    /// Id following `id`, or `None` at the end or for an unknown id.
    #[must_use]
    pub fn next_id(&self, id: &QuestionId) -> Option<&QuestionId> {
        let pos = self.position(id)?;
        self.questions.get(pos + 1).map(Question::id)
    }

    /// Id preceding `id`, or `None` at the start or for an unknown id.
    #[must_use]
    pub fn prev_id(&self, id: &QuestionId) -> Option<&QuestionId> {
        let pos = self.position(id)?;
        pos.checked_sub(1)
            .and_then(|prev| self.questions.get(prev))
            .map(Question::id)
    }

    /// Returns `id` when it names a loaded question, otherwise `fallback`.
    #[must_use]
    pub fn resolve<'a>(
        &'a self,
        id: Option<&'a QuestionId>,
        fallback: &'a QuestionId,
    ) -> &'a QuestionId {
        match id {
            Some(id) if self.contains(id) => id,
            _ => fallback,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    fn q(id: &str) -> Question {
        Question::new(QuestionId::new(id).unwrap(), QuestionType::MultipleChoice, "A")
    }

    fn id(raw: &str) -> QuestionId {
        QuestionId::new(raw).unwrap()
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert_eq!(QuestionSet::new(Vec::new()).unwrap_err(), QuestionSetError::Empty);
        assert_eq!(
            QuestionSet::new(vec![q("a"), q("b"), q("a")]).unwrap_err(),
            QuestionSetError::DuplicateId(id("a"))
        );
    }

    #[test]
    fn navigation_saturates_at_the_ends() {
        let set = QuestionSet::new(vec![q("a"), q("b"), q("c")]).unwrap();
        assert_eq!(set.first_id(), &id("a"));
        assert_eq!(set.next_id(&id("a")), Some(&id("b")));
        assert_eq!(set.next_id(&id("c")), None);
        assert_eq!(set.prev_id(&id("a")), None);
        assert_eq!(set.prev_id(&id("c")), Some(&id("b")));
        assert_eq!(set.next_id(&id("zzz")), None);
    }

    #[test]
    fn resolve_falls_back_for_unknown_ids() {
        let set = QuestionSet::new(vec![q("a"), q("b")]).unwrap();
        let stale = id("gone");
        let known = id("b");
        assert_eq!(set.resolve(Some(&stale), set.first_id()), &id("a"));
        assert_eq!(set.resolve(Some(&known), set.first_id()), &id("b"));
        assert_eq!(set.resolve(None, &known), &id("b"));
    }
}
