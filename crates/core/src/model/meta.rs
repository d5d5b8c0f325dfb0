use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::QuestionId;

//
// ─── VIEW ──────────────────────────────────────────────────────────────────────
//

/// Top-level screen the session is on. Review is a mode of `Result`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Start,
    Quiz,
    Result,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid view: {0:?}")]
pub struct ViewParseError(pub String);

impl View {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            View::Start => "start",
            View::Quiz => "quiz",
            View::Result => "result",
        }
    }
}

impl FromStr for View {
    type Err = ViewParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(View::Start),
            "quiz" => Ok(View::Quiz),
            "result" => Ok(View::Result),
            other => Err(ViewParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PERSISTED METADATA ────────────────────────────────────────────────────────
//

/// The persisted session record, exactly as stored.
///
/// Every field is optional (or defaulted) because the record may be missing,
/// written by an older build, or cut short. Interpretation happens in
/// `SessionState::reconcile`, never here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionMeta {
    #[serde(
        serialize_with = "chrono::serde::ts_milliseconds_option::serialize",
        deserialize_with = "lenient_millis"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        serialize_with = "chrono::serde::ts_milliseconds_option::serialize",
        deserialize_with = "lenient_millis"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_view")]
    pub view: View,
    #[serde(deserialize_with = "lenient_id")]
    pub current_id: Option<QuestionId>,
    #[serde(deserialize_with = "lenient_id")]
    pub review_id: Option<QuestionId>,
}

impl SessionMeta {
    /// Overlay the fields a transition changed, keeping everything else.
    #[must_use]
    pub fn merged(mut self, patch: &MetaPatch) -> Self {
        if let Some(started_at) = patch.started_at {
            self.started_at = started_at;
        }
        if let Some(submitted_at) = patch.submitted_at {
            self.submitted_at = submitted_at;
        }
        if let Some(view) = patch.view {
            self.view = view;
        }
        if let Some(current_id) = &patch.current_id {
            self.current_id = Some(current_id.clone());
        }
        if let Some(review_id) = &patch.review_id {
            self.review_id = Some(review_id.clone());
        }
        self
    }
}

// A field of the wrong JSON type reads as absent instead of failing the record.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(#[allow(dead_code)] IgnoredAny),
}

impl<T> Lenient<T> {
    fn into_value(self) -> Option<T> {
        match self {
            Lenient::Value(value) => Some(value),
            Lenient::Other(_) => None,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = Option::<Lenient<T>>::deserialize(deserializer)?;
    Ok(raw.and_then(Lenient::into_value))
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, i64>(deserializer)?.and_then(DateTime::from_timestamp_millis))
}

fn lenient_view<'de, D>(deserializer: D) -> Result<View, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, String>(deserializer)?
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<QuestionId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, String>(deserializer)?.and_then(|s| QuestionId::new(s).ok()))
}

//
// ─── PATCH ─────────────────────────────────────────────────────────────────────
//

/// The subset of metadata fields one transition writes.
///
/// `None` leaves the stored value alone. Timestamps use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaPatch {
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub submitted_at: Option<Option<DateTime<Utc>>>,
    pub view: Option<View>,
    pub current_id: Option<QuestionId>,
    pub review_id: Option<QuestionId>,
}
