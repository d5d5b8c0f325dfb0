//! Session view state machine.
//!
//! The persisted `SessionMeta` is the source of truth. Each transition is a
//! pure function from the freshly loaded record (plus the question set and the
//! current time) to a `MetaPatch`; the caller merges the patch into the record,
//! writes it back whole, and re-derives `SessionState` with `reconcile`.

use chrono::{DateTime, Utc};

use crate::model::{MetaPatch, QuestionId, QuestionSet, SessionMeta, View};

//
// ─── RECONCILED STATE ──────────────────────────────────────────────────────────
//

/// In-memory session state with every pointer resolved against the loaded
/// question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    view: View,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    current_id: QuestionId,
    review_id: QuestionId,
}

impl SessionState {
    /// Derive the effective state from a persisted record.
    ///
    /// A view is only honored when the timestamp it depends on is present;
    /// otherwise the session falls back to `Start`. Pointers that do not name a
    /// loaded question fall back to the first question (current) and to the
    /// resolved current question (review).
    #[must_use]
    pub fn reconcile(meta: &SessionMeta, questions: &QuestionSet) -> Self {
        let view = match meta.view {
            View::Result if meta.submitted_at.is_some() => View::Result,
            View::Quiz if meta.started_at.is_some() => View::Quiz,
            _ => View::Start,
        };
        let current_id = questions
            .resolve(meta.current_id.as_ref(), questions.first_id())
            .clone();
        let review_id = questions
            .resolve(meta.review_id.as_ref(), &current_id)
            .clone();

        Self {
            view,
            started_at: meta.started_at,
            submitted_at: meta.submitted_at,
            current_id,
            review_id,
        }
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    #[must_use]
    pub fn current_id(&self) -> &QuestionId {
        &self.current_id
    }

    #[must_use]
    pub fn review_id(&self) -> &QuestionId {
        &self.review_id
    }

    /// The pointer navigation moves in the current view.
    #[must_use]
    pub fn active_id(&self) -> &QuestionId {
        match self.view {
            View::Result => &self.review_id,
            View::Start | View::Quiz => &self.current_id,
        }
    }

    /// A quiz was started at some point and can be resumed.
    #[must_use]
    pub fn can_continue(&self) -> bool {
        self.started_at.is_some()
    }

    /// A quiz was submitted at some point and its result can be shown again.
    #[must_use]
    pub fn can_view_result(&self) -> bool {
        self.submitted_at.is_some()
    }
}

/// Returns true if reconciling `meta` would replace a stored pointer.
#[must_use]
pub fn has_stale_pointer(meta: &SessionMeta, questions: &QuestionSet) -> bool {
    let stale = |id: &Option<QuestionId>| id.as_ref().is_some_and(|id| !questions.contains(id));
    stale(&meta.current_id) || stale(&meta.review_id)
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Fresh attempt: new start time, no submission, both pointers on the first
/// question. Answers are cleared separately by the caller.
#[must_use]
pub fn start_new(questions: &QuestionSet, now: DateTime<Utc>) -> MetaPatch {
    let first = questions.first_id().clone();
    MetaPatch {
        started_at: Some(Some(now)),
        submitted_at: Some(None),
        view: Some(View::Quiz),
        current_id: Some(first.clone()),
        review_id: Some(first),
    }
}

/// Resume the quiz where it was left, keeping the original start time.
#[must_use]
pub fn continue_quiz(stored: &SessionMeta, questions: &QuestionSet, now: DateTime<Utc>) -> MetaPatch {
    let current = questions.resolve(stored.current_id.as_ref(), questions.first_id());
    MetaPatch {
        started_at: Some(Some(stored.started_at.unwrap_or(now))),
        view: Some(View::Quiz),
        current_id: Some(current.clone()),
        ..MetaPatch::default()
    }
}

/// Show the last result again.
///
/// Missing timestamps default to `now`. That only happens when the caller
/// skipped the `can_view_result` precondition.
#[must_use]
pub fn go_result(stored: &SessionMeta, questions: &QuestionSet, now: DateTime<Utc>) -> MetaPatch {
    let current = questions.resolve(stored.current_id.as_ref(), questions.first_id());
    let review = questions.resolve(stored.review_id.as_ref(), current);
    MetaPatch {
        started_at: Some(Some(stored.started_at.unwrap_or(now))),
        submitted_at: Some(Some(stored.submitted_at.unwrap_or(now))),
        view: Some(View::Result),
        review_id: Some(review.clone()),
        ..MetaPatch::default()
    }
}

/// Finish the quiz. Review starts on the question the user was looking at.
#[must_use]
pub fn submit(stored: &SessionMeta, questions: &QuestionSet, now: DateTime<Utc>) -> MetaPatch {
    let current = questions.resolve(stored.current_id.as_ref(), questions.first_id());
    MetaPatch {
        submitted_at: Some(Some(now)),
        view: Some(View::Result),
        review_id: Some(current.clone()),
        ..MetaPatch::default()
    }
}

#[must_use]
pub fn jump_to(id: QuestionId) -> MetaPatch {
    MetaPatch {
        current_id: Some(id),
        ..MetaPatch::default()
    }
}

#[must_use]
pub fn jump_review(id: QuestionId) -> MetaPatch {
    MetaPatch {
        review_id: Some(id),
        ..MetaPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionType};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn id(raw: &str) -> QuestionId {
        QuestionId::new(raw).unwrap()
    }

    fn questions() -> QuestionSet {
        QuestionSet::new(
            ["q1", "q2", "q3"]
                .into_iter()
                .map(|raw| Question::new(id(raw), QuestionType::MultipleChoice, "A"))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn first_run_reconciles_to_start() {
        let state = SessionState::reconcile(&SessionMeta::default(), &questions());
        assert_eq!(state.view(), View::Start);
        assert_eq!(state.current_id(), &id("q1"));
        assert_eq!(state.review_id(), &id("q1"));
        assert!(!state.can_continue());
        assert!(!state.can_view_result());
    }

    #[test]
    fn views_require_their_timestamps() {
        let qs = questions();
        let quiz_without_start = SessionMeta {
            view: View::Quiz,
            ..SessionMeta::default()
        };
        assert_eq!(SessionState::reconcile(&quiz_without_start, &qs).view(), View::Start);

        let result_without_submit = SessionMeta {
            view: View::Result,
            started_at: Some(fixed_now()),
            ..SessionMeta::default()
        };
        assert_eq!(
            SessionState::reconcile(&result_without_submit, &qs).view(),
            View::Start
        );

        let result = SessionMeta {
            view: View::Result,
            started_at: Some(fixed_now()),
            submitted_at: Some(fixed_now()),
            ..SessionMeta::default()
        };
        assert_eq!(SessionState::reconcile(&result, &qs).view(), View::Result);
    }

    #[test]
    fn stale_pointers_fall_back() {
        let qs = questions();
        let meta = SessionMeta {
            view: View::Quiz,
            started_at: Some(fixed_now()),
            current_id: Some(id("removed")),
            review_id: Some(id("also-removed")),
            ..SessionMeta::default()
        };
        assert!(has_stale_pointer(&meta, &qs));

        let state = SessionState::reconcile(&meta, &qs);
        assert_eq!(state.current_id(), &id("q1"));
        assert_eq!(state.review_id(), &id("q1"));
    }

    #[test]
    fn stale_review_falls_back_to_resolved_current() {
        let qs = questions();
        let meta = SessionMeta {
            current_id: Some(id("q3")),
            review_id: Some(id("removed")),
            ..SessionMeta::default()
        };
        assert_eq!(SessionState::reconcile(&meta, &qs).review_id(), &id("q3"));
    }

    #[test]
    fn start_new_resets_everything() {
        let qs = questions();
        let stored = SessionMeta {
            started_at: Some(fixed_now() - Duration::hours(2)),
            submitted_at: Some(fixed_now() - Duration::hours(1)),
            view: View::Result,
            current_id: Some(id("q3")),
            review_id: Some(id("q2")),
        };
        let meta = stored.merged(&start_new(&qs, fixed_now()));
        assert_eq!(meta.started_at, Some(fixed_now()));
        assert_eq!(meta.submitted_at, None);
        assert_eq!(meta.view, View::Quiz);
        assert_eq!(meta.current_id, Some(id("q1")));
        assert_eq!(meta.review_id, Some(id("q1")));
    }

    #[test]
    fn continue_keeps_start_time_and_defaults_when_missing() {
        let qs = questions();
        let earlier = fixed_now() - Duration::minutes(5);
        let stored = SessionMeta {
            started_at: Some(earlier),
            view: View::Start,
            current_id: Some(id("q2")),
            ..SessionMeta::default()
        };
        let meta = stored.clone().merged(&continue_quiz(&stored, &qs, fixed_now()));
        assert_eq!(meta.started_at, Some(earlier));
        assert_eq!(meta.view, View::Quiz);
        assert_eq!(meta.current_id, Some(id("q2")));

        let empty = SessionMeta::default();
        let meta = empty.clone().merged(&continue_quiz(&empty, &qs, fixed_now()));
        assert_eq!(meta.started_at, Some(fixed_now()));
        assert_eq!(meta.current_id, Some(id("q1")));
    }

    #[test]
    fn submit_starts_review_at_current_question() {
        let qs = questions();
        let stored = SessionMeta {
            started_at: Some(fixed_now()),
            view: View::Quiz,
            current_id: Some(id("q2")),
            review_id: Some(id("q3")),
            ..SessionMeta::default()
        };
        let later = fixed_now() + Duration::minutes(3);
        let meta = stored.clone().merged(&submit(&stored, &qs, later));
        assert_eq!(meta.view, View::Result);
        assert_eq!(meta.submitted_at, Some(later));
        assert_eq!(meta.review_id, Some(id("q2")));
        assert_eq!(meta.started_at, stored.started_at);
    }

    #[test]
    fn go_result_preserves_timestamps() {
        let qs = questions();
        let start = fixed_now() - Duration::minutes(10);
        let end = fixed_now() - Duration::minutes(4);
        let stored = SessionMeta {
            started_at: Some(start),
            submitted_at: Some(end),
            view: View::Start,
            current_id: Some(id("q2")),
            review_id: Some(id("gone")),
        };
        let meta = stored.clone().merged(&go_result(&stored, &qs, fixed_now()));
        assert_eq!(meta.started_at, Some(start));
        assert_eq!(meta.submitted_at, Some(end));
        assert_eq!(meta.view, View::Result);
        assert_eq!(meta.review_id, Some(id("q2")));
    }

    #[test]
    fn active_pointer_follows_view() {
        let qs = questions();
        let meta = SessionMeta {
            started_at: Some(fixed_now()),
            submitted_at: Some(fixed_now()),
            view: View::Result,
            current_id: Some(id("q1")),
            review_id: Some(id("q3")),
        };
        assert_eq!(SessionState::reconcile(&meta, &qs).active_id(), &id("q3"));
    }
}
