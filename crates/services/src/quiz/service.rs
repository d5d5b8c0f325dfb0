use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{AnswerSheet, MetaPatch, QuestionId, QuestionSet, SessionMeta, View};
use quiz_core::session::{self, SessionState};
use storage::repository::{AnswerRepository, SessionMetaRepository, Storage};

use super::snapshot::QuizSnapshot;
use crate::Clock;
use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of a submit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The quiz is now on the result view.
    Submitted,
    /// The user declined the unanswered-questions warning; nothing changed.
    Cancelled { unanswered: usize },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// The quiz session state machine.
///
/// Holds the loaded question set, the reconciled view state and a cached copy
/// of the answers. Every action that changes session metadata reloads the
/// persisted record, overlays its own fields and writes the whole record back,
/// so fields written by other actions are never dropped.
pub struct QuizSession {
    clock: Clock,
    questions: Arc<QuestionSet>,
    answer_store: Arc<dyn AnswerRepository>,
    meta_store: Arc<dyn SessionMetaRepository>,
    state: SessionState,
    answers: AnswerSheet,
}

impl QuizSession {
    /// Initialize a session for a freshly loaded dataset.
    ///
    /// Creates an empty answer entry for any question that has none, then
    /// derives the view and both navigation pointers from the stored record.
    /// Pointers to questions that are no longer in the dataset are replaced
    /// silently.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if either store cannot be read.
    pub async fn initialize(
        questions: Arc<QuestionSet>,
        clock: Clock,
        storage: &Storage,
    ) -> Result<Self, SessionError> {
        let ids = questions.ids();
        storage.answers.ensure_answers(&ids).await?;
        let answers = storage.answers.get_answers(&ids).await?;

        let meta = storage.meta.load_meta().await?;
        if session::has_stale_pointer(&meta, &questions) {
            tracing::debug!(
                current_id = ?meta.current_id,
                review_id = ?meta.review_id,
                "stored question pointer not in dataset, falling back"
            );
        }
        let state = SessionState::reconcile(&meta, &questions);
        tracing::info!(
            view = %state.view(),
            questions = questions.len(),
            "quiz session initialized"
        );

        Ok(Self {
            clock,
            questions,
            answer_store: Arc::clone(&storage.answers),
            meta_store: Arc::clone(&storage.meta),
            state,
            answers,
        })
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.state.view()
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn can_continue(&self) -> bool {
        self.state.can_continue()
    }

    #[must_use]
    pub fn can_view_result(&self) -> bool {
        self.state.can_view_result()
    }

    /// Derived read-only values as of the session clock.
    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        self.snapshot_at(self.clock.now())
    }

    #[must_use]
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> QuizSnapshot {
        QuizSnapshot::build(&self.questions, &self.answers, &self.state, now)
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────
    //

    /// Begin a fresh attempt from any view, wiping every answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the reset cannot be persisted.
    pub async fn start_new(&mut self) -> Result<(), SessionError> {
        let patch = session::start_new(&self.questions, self.clock.now());
        self.write_meta(&patch).await?;

        let ids = self.questions.ids();
        self.answer_store.clear_all(&ids).await?;
        self.answers.clear();
        tracing::info!(current_id = %self.state.current_id(), "quiz started");
        Ok(())
    }

    /// Resume the quiz from the start or result view.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` when already in the quiz, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn continue_quiz(&mut self) -> Result<(), SessionError> {
        self.require_not(View::Quiz, "continue")?;
        let now = self.clock.now();
        let questions = Arc::clone(&self.questions);
        self.update_meta(|stored| session::continue_quiz(stored, &questions, now))
            .await?;
        tracing::info!(current_id = %self.state.current_id(), "quiz resumed");
        Ok(())
    }

    /// Show the last submitted result again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` from the quiz view, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn go_result(&mut self) -> Result<(), SessionError> {
        self.require_not(View::Quiz, "view result")?;
        if !self.state.can_view_result() {
            tracing::warn!("showing result without a stored submission, defaulting timestamps");
        }
        let now = self.clock.now();
        let questions = Arc::clone(&self.questions);
        self.update_meta(|stored| session::go_result(stored, &questions, now))
            .await?;
        tracing::info!(review_id = %self.state.review_id(), "showing last result");
        Ok(())
    }

    /// Submit the quiz.
    ///
    /// If some questions are unanswered, `confirm` is called with their count
    /// and must return `true` to go ahead. It is not called when every
    /// question has an answer. Declining changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside the quiz view, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn submit<F>(&mut self, confirm: F) -> Result<SubmitOutcome, SessionError>
    where
        F: FnOnce(usize) -> bool,
    {
        self.require(View::Quiz, "submit")?;
        let unanswered = self.answers.unanswered_count(&self.questions);
        if unanswered > 0 && !confirm(unanswered) {
            tracing::info!(unanswered, "submit cancelled");
            return Ok(SubmitOutcome::Cancelled { unanswered });
        }

        let now = self.clock.now();
        let questions = Arc::clone(&self.questions);
        self.update_meta(|stored| session::submit(stored, &questions, now))
            .await?;
        tracing::info!(unanswered, review_id = %self.state.review_id(), "quiz submitted");
        Ok(SubmitOutcome::Submitted)
    }

    /// Move the quiz pointer to `id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside the quiz view,
    /// `SessionError::UnknownQuestion` for an id not in the dataset, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn jump_to(&mut self, id: &QuestionId) -> Result<(), SessionError> {
        self.require(View::Quiz, "jump")?;
        self.require_known(id)?;
        self.write_meta(&session::jump_to(id.clone())).await
    }

    /// Move the review pointer to `id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside the result view,
    /// `SessionError::UnknownQuestion` for an id not in the dataset, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn jump_review(&mut self, id: &QuestionId) -> Result<(), SessionError> {
        self.require(View::Result, "review")?;
        self.require_known(id)?;
        self.write_meta(&session::jump_review(id.clone())).await
    }

    /// Step the active pointer forward; stays put on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` on the start view, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn next(&mut self) -> Result<(), SessionError> {
        let target = self.questions.next_id(self.state.active_id()).cloned();
        self.step(target, "next").await
    }

    /// Step the active pointer back; stays put on the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` on the start view, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn prev(&mut self) -> Result<(), SessionError> {
        let target = self.questions.prev_id(self.state.active_id()).cloned();
        self.step(target, "previous").await
    }

    async fn step(
        &mut self,
        target: Option<QuestionId>,
        action: &'static str,
    ) -> Result<(), SessionError> {
        let view = self.state.view();
        match (view, target) {
            (View::Start, _) => Err(SessionError::InvalidTransition { action, view }),
            (_, None) => Ok(()),
            (View::Quiz, Some(id)) => self.jump_to(&id).await,
            (View::Result, Some(id)) => self.jump_review(&id).await,
        }
    }

    /// Record the answer text for one question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside the quiz view,
    /// `SessionError::UnknownQuestion` for an id not in the dataset, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn set_answer(&mut self, id: &QuestionId, answer: &str) -> Result<(), SessionError> {
        self.require(View::Quiz, "answer")?;
        self.require_known(id)?;
        self.answer_store.set_answer(id, answer).await?;
        self.answers.set(id.clone(), answer);
        Ok(())
    }

    /// Reset every answer to empty after `confirm` returns `true`.
    ///
    /// Start time, view and pointers are untouched. Returns whether the
    /// answers were cleared.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside the quiz view, or
    /// `SessionError::Storage` on persistence failures.
    pub async fn clear_answers<F>(&mut self, confirm: F) -> Result<bool, SessionError>
    where
        F: FnOnce() -> bool,
    {
        self.require(View::Quiz, "clear answers")?;
        if !confirm() {
            return Ok(false);
        }
        let ids = self.questions.ids();
        self.answer_store.clear_all(&ids).await?;
        self.answers.clear();
        tracing::info!("answers cleared");
        Ok(true)
    }

    //
    // ─── PERSISTENCE ───────────────────────────────────────────────────────
    //

    async fn write_meta(&mut self, patch: &MetaPatch) -> Result<(), SessionError> {
        self.update_meta(|_| patch.clone()).await
    }

    /// Read the stored record, build the patch against it, merge, write the
    /// whole record and re-derive the in-memory state.
    async fn update_meta<F>(&mut self, build: F) -> Result<(), SessionError>
    where
        F: FnOnce(&SessionMeta) -> MetaPatch,
    {
        let stored = self.meta_store.load_meta().await?;
        let patch = build(&stored);
        let merged = stored.merged(&patch);
        self.meta_store.save_meta(&merged).await?;
        self.state = SessionState::reconcile(&merged, &self.questions);
        Ok(())
    }

    fn require(&self, view: View, action: &'static str) -> Result<(), SessionError> {
        if self.state.view() == view {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                view: self.state.view(),
            })
        }
    }

    fn require_not(&self, view: View, action: &'static str) -> Result<(), SessionError> {
        if self.state.view() == view {
            Err(SessionError::InvalidTransition { action, view })
        } else {
            Ok(())
        }
    }

    fn require_known(&self, id: &QuestionId) -> Result<(), SessionError> {
        if self.questions.contains(id) {
            Ok(())
        } else {
            Err(SessionError::UnknownQuestion(id.clone()))
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("state", &self.state)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
