//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! `registry` owns room state and snapshots. `session` binds connections to
//! rooms and fans snapshots out, so the route can stay focused on socket I/O.

pub mod registry;
pub mod session;
