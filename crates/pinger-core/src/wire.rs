use crate::ApplicationStatus;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// One inbound feed message, tagged by shape at the decode boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusMessage {
    /// Complete replacement set, sent by the feed as a JSON array.
    Snapshot(Vec<ApplicationStatus>),
    /// Single-application update, sent by the feed as a JSON object.
    Delta(ApplicationStatus),
}

impl StatusMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            StatusMessage::Snapshot(_) => "snapshot",
            StatusMessage::Delta(_) => "delta",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload is not valid json: {0}")]
    Malformed(String),
    #[error("expected a status array or object, got {0}")]
    UnexpectedShape(&'static str),
    #[error("invalid status record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

pub fn decode_message(raw: &str) -> Result<StatusMessage, DecodeError> {
    decode_frame(raw.as_bytes())
}

/// Decodes one frame: array -> snapshot, object -> delta.
///
/// A snapshot is rejected as a whole when any element fails to decode, so a
/// partially valid array never reaches the store.
pub fn decode_frame(bytes: &[u8]) -> Result<StatusMessage, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::Malformed(err.to_string()))?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| decode_record(index, item))
            .collect::<Result<Vec<_>, _>>()
            .map(StatusMessage::Snapshot),
        Value::Object(map) => decode_record(0, Value::Object(map)).map(StatusMessage::Delta),
        other => Err(DecodeError::UnexpectedShape(value_kind(&other))),
    }
}

pub fn encode_message(message: &StatusMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

fn decode_record(index: usize, value: Value) -> Result<ApplicationStatus, DecodeError> {
    serde_json::from_value(value).map_err(|err| DecodeError::InvalidRecord {
        index,
        reason: err.to_string(),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
