//! Peer mirroring for two human seats on a shared broadcast channel.
//!
//! ## Overview
//!
//! - `event`: tagged `SyncEvent`s and the bincode `Envelope`
//! - `channel`: the `Transport` trait and the in-process `LocalBus`
//! - `peer`: per-participant sequencing and inbound filtering
//! - `matchmaking`: the announce/claim/ack seat assignment handshake
//!
//! Mirroring is best-effort. Inbound game events are trusted and applied
//! without re-validation; nothing reconciles diverged state.

pub mod channel;
pub mod event;
pub mod matchmaking;
pub mod peer;

use thiserror::Error;

pub use channel::{BusEndpoint, LocalBus, Transport, CHANNEL};
pub use event::{Envelope, ParticipantId, SyncEvent};
pub use matchmaking::{Assignment, MatchmakingState, Matchmaker, Role, ANNOUNCE_INTERVAL_MS};
pub use peer::Peer;

/// Sync channel failures.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("envelope codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("{claimer} claimed a seat that is already taken")]
    DuplicateClaim { claimer: ParticipantId },
    #[error("already matched")]
    AlreadyMatched,
}
