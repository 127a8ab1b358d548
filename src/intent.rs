//! Intent decoding — turns inbound frames into typed room intents.
//!
//! Event names follow the websocket protocol (`join`, `vote`, `reveal`,
//! `reset`). The legacy client names (`joinRoom`, `revealVotes`,
//! `resetVotes`, and `username` for the display name) are accepted too.
//!
//! Empty names or room ids are NOT decode errors: they decode fine and the
//! session layer rejects them, so the rejection is visible in one place.

use crate::card::{Card, CardError};
use crate::frame::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Join { display_name: String, room_id: String },
    Vote(Card),
    Reveal,
    Reset,
}

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    InvalidCard(#[from] CardError),
}

impl Intent {
    /// Short name used in log fields.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Join { .. } => "join",
            Intent::Vote(_) => "vote",
            Intent::Reveal => "reveal",
            Intent::Reset => "reset",
        }
    }
}

impl TryFrom<&Frame> for Intent {
    type Error = IntentError;

    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        match frame.event.as_str() {
            "join" | "joinRoom" => {
                let display_name = frame
                    .str_field("displayName")
                    .or_else(|| frame.str_field("username"))
                    .ok_or(IntentError::MissingField("displayName"))?;
                let room_id = frame
                    .str_field("roomId")
                    .ok_or(IntentError::MissingField("roomId"))?;
                Ok(Intent::Join { display_name: display_name.to_owned(), room_id: room_id.to_owned() })
            }
            "vote" => {
                let value = frame
                    .data
                    .get("value")
                    .ok_or(IntentError::MissingField("value"))?;
                Ok(Intent::Vote(Card::from_json(value)?))
            }
            "reveal" | "revealVotes" => Ok(Intent::Reveal),
            "reset" | "resetVotes" => Ok(Intent::Reset),
            other => Err(IntentError::UnknownEvent(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "intent_test.rs"]
mod tests;
