//! Card deck — the fixed set of values a participant can vote with.
//!
//! DESIGN
//! ======
//! Cards travel over the wire as their string label (`"5"`, `"?"`, `"☕"`).
//! Older clients send numeric cards as JSON integers, so decoding accepts
//! either form. Deck order is the order of `Card::ALL` and drives the
//! ordering of revealed vote summaries.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Card {
    Zero,
    One,
    Two,
    Three,
    Five,
    Eight,
    Thirteen,
    Twenty,
    Forty,
    Hundred,
    Unsure,
    Coffee,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("not a card: {0}")]
    Unknown(String),
}

impl Card {
    /// Every card, in deck order.
    pub const ALL: [Card; 12] = [
        Card::Zero,
        Card::One,
        Card::Two,
        Card::Three,
        Card::Five,
        Card::Eight,
        Card::Thirteen,
        Card::Twenty,
        Card::Forty,
        Card::Hundred,
        Card::Unsure,
        Card::Coffee,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Card::Zero => "0",
            Card::One => "1",
            Card::Two => "2",
            Card::Three => "3",
            Card::Five => "5",
            Card::Eight => "8",
            Card::Thirteen => "13",
            Card::Twenty => "20",
            Card::Forty => "40",
            Card::Hundred => "100",
            Card::Unsure => "?",
            Card::Coffee => "☕",
        }
    }

    /// Decode a card from a raw JSON value: a label string or a numeric card.
    ///
    /// # Errors
    ///
    /// Returns `CardError::Unknown` for anything outside the deck.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CardError> {
        match value {
            serde_json::Value::String(s) => s.parse(),
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(v) => v.to_string().parse(),
                None => Err(CardError::Unknown(n.to_string())),
            },
            other => Err(CardError::Unknown(other.to_string())),
        }
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Card::ALL
            .into_iter()
            .find(|card| card.label() == trimmed)
            .ok_or_else(|| CardError::Unknown(s.to_owned()))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// SERDE
// =============================================================================

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
