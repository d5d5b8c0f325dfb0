//! Periodic elapsed-time ticks for the quiz clock display.

use std::ops::ControlFlow;
use std::time::Duration as StdDuration;

use chrono::Duration;
use quiz_core::elapsed::elapsed;
use quiz_core::session::SessionState;

use crate::Clock;

/// Recomputes elapsed time from the session timestamps once per period.
///
/// The ticker works on a copy of the session state and never writes anything,
/// so it cannot race with user actions. Rebuild it after a transition.
#[derive(Debug, Clone)]
pub struct ElapsedTicker {
    state: SessionState,
    clock: Clock,
    period: StdDuration,
}

impl ElapsedTicker {
    #[must_use]
    pub fn new(state: SessionState, clock: Clock) -> Self {
        Self {
            state,
            clock,
            period: StdDuration::from_secs(1),
        }
    }

    #[must_use]
    pub fn with_period(mut self, period: StdDuration) -> Self {
        self.period = period;
        self
    }

    /// Call `on_tick` with the current elapsed time every period until it
    /// returns `ControlFlow::Break`. The first tick fires immediately.
    pub async fn run<F>(self, mut on_tick: F)
    where
        F: FnMut(Duration) -> ControlFlow<()>,
    {
        let mut interval = tokio::time::interval(self.period);
        loop {
            interval.tick().await;
            if on_tick(elapsed(&self.state, self.clock.now())).is_break() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionId, QuestionSet, QuestionType, SessionMeta, View};
    use quiz_core::time::fixed_now;

    fn state(meta: &SessionMeta) -> SessionState {
        let questions = QuestionSet::new(vec![Question::new(
            QuestionId::new("q1").unwrap(),
            QuestionType::MultipleChoice,
            "A",
        )])
        .unwrap();
        SessionState::reconcile(meta, &questions)
    }

    #[tokio::test]
    async fn stops_when_callback_breaks() {
        let running = state(&SessionMeta {
            started_at: Some(fixed_now() - Duration::seconds(42)),
            view: View::Quiz,
            ..SessionMeta::default()
        });
        let ticker = ElapsedTicker::new(running, Clock::fixed(fixed_now()))
            .with_period(StdDuration::from_millis(1));

        let mut seen = Vec::new();
        ticker
            .run(|value| {
                seen.push(value);
                if seen.len() == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(seen, vec![Duration::seconds(42); 3]);
    }

    #[tokio::test]
    async fn submitted_session_ticks_frozen_value() {
        let submitted = state(&SessionMeta {
            started_at: Some(fixed_now() - Duration::minutes(10)),
            submitted_at: Some(fixed_now() - Duration::minutes(7)),
            view: View::Result,
            ..SessionMeta::default()
        });
        let ticker = ElapsedTicker::new(submitted, Clock::system())
            .with_period(StdDuration::from_millis(1));

        let mut first = None;
        ticker
            .run(|value| {
                assert_eq!(value, Duration::minutes(3));
                if first.replace(value).is_some() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;
    }
}
