use quiz_core::model::{QuestionId, SessionMeta};

use crate::repository::StorageError;

pub(crate) const ANSWER_PREFIX: &str = "answer:";
pub(crate) const META_KEY: &str = "session_meta";

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn answer_key(id: &QuestionId) -> String {
    format!("{ANSWER_PREFIX}{id}")
}

/// Decodes the stored session record.
///
/// A record that is not valid JSON (for example one cut short by a crash)
/// reads as the default record.
pub(crate) fn decode_meta(raw: &str) -> SessionMeta {
    match serde_json::from_str(raw) {
        Ok(meta) => meta,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable session record, using defaults");
            SessionMeta::default()
        }
    }
}

pub(crate) fn encode_meta(meta: &SessionMeta) -> Result<String, StorageError> {
    serde_json::to_string(meta).map_err(ser)
}
