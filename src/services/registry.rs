//! Room registry — authoritative in-memory room state.
//!
//! DESIGN
//! ======
//! The registry owns every `Room` and `Participant`. Callers address rooms
//! by id and participants by connection id; they never hold references into
//! the map. Each mutation reports an `Outcome` so the caller can decide
//! whether to broadcast or treat the room as gone.
//!
//! Rooms exist only while populated. Removing the last participant deletes
//! the room outright, so re-joining the same id starts from fresh state.
//!
//! MASKING
//! =======
//! `snapshot` omits vote values until the room is revealed. Masking happens
//! here rather than in the client so unrevealed votes never reach the wire.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::card::Card;

/// Transport-owned identity of one live connection.
pub type ConnectionId = Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Result of a registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Room exists and reflects the mutation. Broadcast it.
    Applied,
    /// Nothing matched. No state changed.
    Ignored,
    /// The mutation emptied the room and it was deleted.
    Closed,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub display_name: String,
    pub vote: Option<Card>,
    /// Position in the room's join order.
    joined_seq: u64,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub participants: HashMap<ConnectionId, Participant>,
    pub votes_revealed: bool,
    next_seq: u64,
}

impl Room {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), participants: HashMap::new(), votes_revealed: false, next_seq: 0 }
    }

    /// Participants in join order.
    fn ordered(&self) -> Vec<&Participant> {
        let mut list: Vec<&Participant> = self.participants.values().collect();
        list.sort_by_key(|p| p.joined_seq);
        list
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// The masked, outward-facing view of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub participants: Vec<ParticipantView>,
    pub votes_revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<VoteSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub display_name: String,
    pub has_voted: bool,
    /// Only present once votes are revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub total_votes: usize,
    /// Vote counts in deck order; cards nobody picked are left out.
    pub distribution: Vec<VoteCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Card>,
    pub consensus_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteCount {
    pub value: Card,
    pub count: usize,
}

impl VoteSummary {
    /// Tally revealed votes. Ties for the mode go to the earlier card in the deck.
    #[must_use]
    pub fn tally(votes: impl IntoIterator<Item = Card>) -> Self {
        let mut counts = [0usize; Card::ALL.len()];
        let mut total_votes = 0usize;
        for card in votes {
            if let Some(idx) = Card::ALL.iter().position(|c| *c == card) {
                counts[idx] += 1;
                total_votes += 1;
            }
        }

        let distribution: Vec<VoteCount> = Card::ALL
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(card, count)| VoteCount { value: *card, count })
            .collect();

        let mut mode: Option<&VoteCount> = None;
        for entry in &distribution {
            if mode.is_none_or(|best| entry.count > best.count) {
                mode = Some(entry);
            }
        }

        let consensus_percent = match mode {
            Some(best) if total_votes > 0 => {
                let pct = (best.count * 200 + total_votes) / (total_votes * 2);
                u8::try_from(pct).unwrap_or(100)
            }
            _ => 0,
        };

        Self { total_votes, mode: mode.map(|m| m.value), distribution, consensus_percent }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Debug, Default)]
pub struct Registry {
    rooms: HashMap<String, Room>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the room, creating an empty unrevealed one if needed.
    pub fn ensure_room(&mut self, room_id: &str) -> &mut Room {
        self.rooms
            .entry(room_id.to_owned())
            .or_insert_with(|| Room::new(room_id))
    }

    /// Insert or overwrite a participant with no vote. Overwrites keep their
    /// original join position.
    pub fn add_participant(&mut self, room_id: &str, connection_id: ConnectionId, display_name: &str) -> Outcome {
        if display_name.is_empty() {
            return Outcome::Ignored;
        }
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Outcome::Ignored;
        };

        let joined_seq = match room.participants.get(&connection_id) {
            Some(existing) => existing.joined_seq,
            None => {
                let seq = room.next_seq;
                room.next_seq += 1;
                seq
            }
        };
        room.participants.insert(
            connection_id,
            Participant { display_name: display_name.to_owned(), vote: None, joined_seq },
        );
        Outcome::Applied
    }

    /// Record a vote for a current participant of the room.
    pub fn record_vote(&mut self, room_id: &str, connection_id: ConnectionId, card: Card) -> Outcome {
        let Some(participant) = self
            .rooms
            .get_mut(room_id)
            .and_then(|room| room.participants.get_mut(&connection_id))
        else {
            return Outcome::Ignored;
        };
        participant.vote = Some(card);
        Outcome::Applied
    }

    pub fn reveal_votes(&mut self, room_id: &str) -> Outcome {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Outcome::Ignored;
        };
        room.votes_revealed = true;
        Outcome::Applied
    }

    /// Clear every vote and hide the table for the next round.
    pub fn reset_votes(&mut self, room_id: &str) -> Outcome {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Outcome::Ignored;
        };
        for participant in room.participants.values_mut() {
            participant.vote = None;
        }
        room.votes_revealed = false;
        Outcome::Applied
    }

    /// Remove a participant. Deletes the room when it empties.
    pub fn remove_participant(&mut self, room_id: &str, connection_id: ConnectionId) -> Outcome {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Outcome::Ignored;
        };
        if room.participants.remove(&connection_id).is_none() {
            return Outcome::Ignored;
        }

        if room.participants.is_empty() {
            self.rooms.remove(room_id);
            info!(%room_id, "room empty, evicted");
            return Outcome::Closed;
        }
        Outcome::Applied
    }

    /// Masked view of a room, or `None` if it does not exist.
    #[must_use]
    pub fn snapshot(&self, room_id: &str) -> Option<RoomSnapshot> {
        let room = self.rooms.get(room_id)?;
        let ordered = room.ordered();

        let participants = ordered
            .iter()
            .map(|p| ParticipantView {
                display_name: p.display_name.clone(),
                has_voted: p.vote.is_some(),
                vote: if room.votes_revealed { p.vote } else { None },
            })
            .collect();

        let summary = room
            .votes_revealed
            .then(|| VoteSummary::tally(ordered.iter().filter_map(|p| p.vote)));

        Some(RoomSnapshot {
            room_id: room.id.clone(),
            participants,
            votes_revealed: room.votes_revealed,
            summary,
        })
    }

    /// Connection ids currently in the room. Used as broadcast targets.
    #[must_use]
    pub fn participant_ids(&self, room_id: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|room| room.participants.keys().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
