use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod store;
pub mod view;
pub mod wire;

pub use store::{ApplyOutcome, ClientState, StateStore, StatusCollection, Subscriber};
pub use view::{render, Display, StatusClass, StatusRow, LOADING_TEXT};
pub use wire::{decode_frame, decode_message, encode_message, DecodeError, StatusMessage};

/// Latest known status of one monitored application, keyed by `app`.
///
/// Fields the feed adds beyond `app` and `isOk` are kept in `extra` and
/// written back unchanged, in their original order, when the record is
/// serialized again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationStatus {
    pub app: String,
    #[serde(rename = "isOk")]
    pub is_ok: bool,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationStatus {
    pub fn new(app: impl Into<String>, is_ok: bool) -> Self {
        Self {
            app: app.into(),
            is_ok,
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
