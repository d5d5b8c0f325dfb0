use chrono::{DateTime, Duration, Utc};
use quiz_core::elapsed::{elapsed, format_elapsed};
use quiz_core::model::{AnswerSheet, Question, QuestionId, QuestionSet, View};
use quiz_core::scoring::{self, GridStatus, Score};
use quiz_core::session::SessionState;

use super::progress::QuizProgress;

/// Score figures for the result view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub correct: usize,
    pub wrong: usize,
    pub unanswered: usize,
    pub total: usize,
    pub percent: f64,
}

/// One cell of the question grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub id: QuestionId,
    pub answered: bool,
    pub status: GridStatus,
}

/// Everything the presentation layer reads, recomputed from
/// `{questions, answers, state, now}` on each call.
#[derive(Debug, Clone)]
pub struct QuizSnapshot {
    pub view: View,
    pub current_index: usize,
    pub current: Question,
    pub current_answer: String,
    pub review_index: usize,
    pub review: Question,
    pub review_answer: String,
    pub progress: QuizProgress,
    pub elapsed: Duration,
    pub elapsed_display: String,
    pub score: ScoreSummary,
    pub grid: Vec<GridCell>,
    pub can_continue: bool,
    pub can_view_result: bool,
}

impl QuizSnapshot {
    pub(crate) fn build(
        questions: &QuestionSet,
        answers: &AnswerSheet,
        state: &SessionState,
        now: DateTime<Utc>,
    ) -> Self {
        let (current_index, current) = locate(questions, state.current_id());
        let (review_index, review) = locate(questions, state.review_id());

        let grid: Vec<GridCell> = questions
            .iter()
            .zip(scoring::grid(questions, answers))
            .map(|(q, status)| GridCell {
                id: q.id().clone(),
                answered: answers.is_answered(q.id()),
                status,
            })
            .collect();

        let score = Score::compute(questions, answers);
        let unanswered = grid
            .iter()
            .filter(|cell| cell.status == GridStatus::Unanswered)
            .count();
        let score = ScoreSummary {
            correct: score.correct,
            wrong: score.total - score.correct - unanswered,
            unanswered,
            total: score.total,
            percent: score.percent(),
        };

        let elapsed = elapsed(state, now);

        Self {
            view: state.view(),
            current_index,
            current_answer: answers.get(current.id()).to_owned(),
            current: current.clone(),
            review_index,
            review_answer: answers.get(review.id()).to_owned(),
            review: review.clone(),
            progress: QuizProgress::compute(questions, answers),
            elapsed,
            elapsed_display: format_elapsed(elapsed),
            score,
            grid,
            can_continue: state.can_continue(),
            can_view_result: state.can_view_result(),
        }
    }

    /// Whether the question under review was answered correctly.
    #[must_use]
    pub fn review_is_correct(&self) -> bool {
        scoring::is_correct(&self.review, &self.review_answer)
    }
}

// Pointers in a reconciled state always name a loaded question.
fn locate<'a>(questions: &'a QuestionSet, id: &QuestionId) -> (usize, &'a Question) {
    match (questions.position(id), questions.get(id)) {
        (Some(pos), Some(question)) => (pos, question),
        _ => (0, questions.first()),
    }
}
