//! Elapsed quiz time, derived from the two session timestamps on every tick.

use chrono::{DateTime, Duration, Utc};

use crate::model::View;
use crate::session::SessionState;

/// Time spent on the quiz as of `now`.
///
/// Runs while the session is not on the result view and freezes at
/// `submitted_at - started_at` once it is. Never negative.
#[must_use]
pub fn elapsed(state: &SessionState, now: DateTime<Utc>) -> Duration {
    let Some(started_at) = state.started_at() else {
        return Duration::zero();
    };
    let end = match (state.view(), state.submitted_at()) {
        (View::Result, Some(submitted_at)) => submitted_at,
        _ => now,
    };
    (end - started_at).max(Duration::zero())
}

/// Formats a duration as `MM:SS`, or `H:MM:SS` from one hour on.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
