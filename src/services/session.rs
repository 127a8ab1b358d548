//! Session binding — connects live websocket connections to rooms.
//!
//! ARCHITECTURE
//! ============
//! `Sessions` owns the room `Registry`, a side table of connection bindings,
//! and each connection's outbound channel. Transport code hands it intents
//! and disconnects; it never touches the registry directly.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` registers the outbound sender. The connection is unbound.
//! 2. A valid `join` binds it to one room for the rest of its life.
//! 3. `vote` / `reveal` / `reset` resolve the bound room, mutate, broadcast.
//! 4. `disconnect` removes the participant and evicts the room if empty.
//!
//! CONCURRENCY
//! ===========
//! `apply` and `disconnect` take `&mut self`, so the caller's lock covers the
//! whole mutate → snapshot → fan-out step. Fan-out uses `try_send` and never
//! waits, which keeps that lock short.
//!
//! A connection whose channel is full has fallen behind and would miss the
//! newest snapshot. It is evicted: its sender is dropped, which ends the
//! relay loop and closes the socket, and the room is re-broadcast without it.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::frame::{EVENT_ROOM_UPDATE, Frame};
use crate::intent::Intent;
use crate::services::registry::{ConnectionId, Outcome, Registry, RoomSnapshot};

// =============================================================================
// TYPES
// =============================================================================

/// What a bound connection knows about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room_id: String,
    pub display_name: String,
}

#[derive(Debug, Default)]
pub struct Sessions {
    registry: Registry,
    bindings: HashMap<ConnectionId, Binding>,
    clients: HashMap<ConnectionId, mpsc::Sender<Frame>>,
}

impl Sessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.registry.room_count()
    }

    #[must_use]
    pub fn binding(&self, connection_id: ConnectionId) -> Option<&Binding> {
        self.bindings.get(&connection_id)
    }

    // =========================================================================
    // CONNECTION LIFECYCLE
    // =========================================================================

    /// Register a new, unbound connection and its outbound channel.
    pub fn connect(&mut self, connection_id: ConnectionId, tx: mpsc::Sender<Frame>) {
        self.clients.insert(connection_id, tx);
    }

    /// Drop a connection. Returns the snapshot broadcast to the remaining
    /// participants, if the room survived.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<RoomSnapshot> {
        self.clients.remove(&connection_id);
        let binding = self.bindings.remove(&connection_id)?;
        let room_id = binding.room_id.as_str();

        match self.registry.remove_participant(room_id, connection_id) {
            Outcome::Applied => {
                info!(%connection_id, %room_id, display_name = %binding.display_name, "participant left room");
                self.broadcast(room_id)
            }
            Outcome::Closed => {
                info!(%connection_id, %room_id, display_name = %binding.display_name, "last participant left room");
                None
            }
            Outcome::Ignored => None,
        }
    }

    // =========================================================================
    // INTENTS
    // =========================================================================

    /// Apply one intent from a connection. Returns the snapshot that was
    /// broadcast, or `None` if the intent was dropped.
    pub fn apply(&mut self, connection_id: ConnectionId, intent: Intent) -> Option<RoomSnapshot> {
        let name = intent.name();
        let snapshot = match intent {
            Intent::Join { display_name, room_id } => self.join(connection_id, &display_name, &room_id),
            Intent::Vote(card) => {
                let room_id = self.bound_room(connection_id)?;
                match self.registry.record_vote(&room_id, connection_id, card) {
                    Outcome::Applied => self.broadcast(&room_id),
                    Outcome::Ignored | Outcome::Closed => None,
                }
            }
            Intent::Reveal => {
                let room_id = self.bound_room(connection_id)?;
                match self.registry.reveal_votes(&room_id) {
                    Outcome::Applied => {
                        info!(%connection_id, %room_id, "votes revealed");
                        self.broadcast(&room_id)
                    }
                    Outcome::Ignored | Outcome::Closed => None,
                }
            }
            Intent::Reset => {
                let room_id = self.bound_room(connection_id)?;
                match self.registry.reset_votes(&room_id) {
                    Outcome::Applied => {
                        info!(%connection_id, %room_id, "votes reset");
                        self.broadcast(&room_id)
                    }
                    Outcome::Ignored | Outcome::Closed => None,
                }
            }
        };

        if snapshot.is_none() {
            debug!(%connection_id, intent = name, "intent dropped");
        }
        snapshot
    }

    fn join(&mut self, connection_id: ConnectionId, display_name: &str, room_id: &str) -> Option<RoomSnapshot> {
        let display_name = display_name.trim();
        let room_id = room_id.trim();
        if display_name.is_empty() || room_id.is_empty() {
            debug!(%connection_id, "join rejected: empty display name or room id");
            return None;
        }
        if let Some(existing) = self.bindings.get(&connection_id) {
            warn!(%connection_id, bound_room = %existing.room_id, requested_room = %room_id, "join rejected: connection already bound");
            return None;
        }

        let created = !self.registry.contains_room(room_id);
        self.registry.ensure_room(room_id);
        match self.registry.add_participant(room_id, connection_id, display_name) {
            Outcome::Applied => {}
            Outcome::Ignored | Outcome::Closed => return None,
        }
        self.bindings.insert(
            connection_id,
            Binding { room_id: room_id.to_owned(), display_name: display_name.to_owned() },
        );

        let participants = self.registry.participant_ids(room_id).len();
        info!(%connection_id, %room_id, %display_name, participants, created, "participant joined room");
        self.broadcast(room_id)
    }

    /// Room the connection is bound to. Unbound connections get `None`.
    fn bound_room(&self, connection_id: ConnectionId) -> Option<String> {
        self.binding(connection_id)
            .map(|binding| binding.room_id.clone())
    }

    // =========================================================================
    // BROADCAST
    // =========================================================================

    /// Send the room's current snapshot to every connection bound to it.
    ///
    /// Connections with a full channel are evicted and the room is sent again
    /// to whoever remains, until every remaining connection has the newest
    /// snapshot queued. Returns `None` if the room no longer exists.
    fn broadcast(&mut self, room_id: &str) -> Option<RoomSnapshot> {
        loop {
            let snapshot = self.registry.snapshot(room_id)?;
            let frame = match Frame::with_payload(EVENT_ROOM_UPDATE, &snapshot) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(%room_id, error = %e, "failed to encode room snapshot");
                    return None;
                }
            };

            let mut lagging = Vec::new();
            for connection_id in self.registry.participant_ids(room_id) {
                let Some(tx) = self.clients.get(&connection_id) else {
                    continue;
                };
                match tx.try_send(frame.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => lagging.push(connection_id),
                    // Receiver gone; the transport's disconnect cleans up.
                    Err(TrySendError::Closed(_)) => {
                        debug!(%connection_id, %room_id, "room update not delivered: connection closing");
                    }
                }
            }

            if lagging.is_empty() {
                return Some(snapshot);
            }
            for connection_id in lagging {
                self.evict(connection_id, room_id);
            }
        }
    }

    /// Drop a lagging connection from its room without broadcasting.
    /// Removing its sender closes the channel, which ends its relay loop.
    fn evict(&mut self, connection_id: ConnectionId, room_id: &str) {
        self.clients.remove(&connection_id);
        let display_name = self
            .bindings
            .remove(&connection_id)
            .map(|binding| binding.display_name)
            .unwrap_or_default();
        let outcome = self.registry.remove_participant(room_id, connection_id);
        warn!(%connection_id, %room_id, %display_name, ?outcome, "evicted lagging connection");
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
