//! Frame — the JSON envelope for every websocket message.
//!
//! DESIGN
//! ======
//! - Flat data: payload is always `Map<String, Value>`.
//! - Clients may omit `id` and `ts`; the server fills them in on decode.
//! - The websocket handler never inspects `data`. Decoding a frame into a
//!   typed intent happens in `crate::intent`.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// EVENT NAMES
// =============================================================================

/// Server → client: full room snapshot after a mutation.
pub const EVENT_ROOM_UPDATE: &str = "roomUpdate";

/// Server → client: sent once after the websocket upgrade.
pub const EVENT_CONNECTED: &str = "connected";

// =============================================================================
// TYPES
// =============================================================================

/// Flat key-value payload. Alias to reduce noise in signatures.
pub type Data = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    #[serde(default = "now_ms")]
    pub ts: i64,
    pub event: String,
    #[serde(default)]
    pub data: Data,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Data) -> Self {
        Self { id: Uuid::new_v4(), ts: now_ms(), event: event.into(), data }
    }

    /// Build a frame whose data is the serialized form of `payload`.
    ///
    /// # Errors
    ///
    /// Fails if `payload` does not serialize to a JSON object.
    pub fn with_payload<T: Serialize>(event: impl Into<String>, payload: &T) -> Result<Self, FrameError> {
        match serde_json::to_value(payload)? {
            serde_json::Value::Object(map) => Ok(Self::new(event, map.into_iter().collect())),
            _ => Err(FrameError::NotAnObject),
        }
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Look up a string field in `data`.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
