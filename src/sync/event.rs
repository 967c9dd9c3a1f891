//! Tagged peer events and their wire envelope.
//!
//! Everything a participant resolves locally (a settled roll, a finished
//! move, a turn rotation) is mirrored to the peer as one `SyncEvent`. The
//! matchmaking handshake rides the same channel.
//!
//! Envelopes are encoded with bincode:
//!
//! ```
//! use ludo_core::core::{Roll, Seat};
//! use ludo_core::sync::{Envelope, ParticipantId, SyncEvent};
//!
//! let envelope = Envelope::new(
//!     ParticipantId::new(7),
//!     1,
//!     SyncEvent::Roll { seat: Seat::Red, roll: Roll::new(6, 6).unwrap() },
//! );
//! let bytes = envelope.encode().unwrap();
//! assert_eq!(Envelope::decode(&bytes).unwrap(), envelope);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{DieChoice, Roll, Seat};
use crate::pieces::PieceId;

use super::SyncError;

/// Identifies one participant on the shared channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(u64);

impl ParticipantId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// One mirrored action or handshake message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEvent {
    /// A participant is looking for an opponent.
    Announce { participant: ParticipantId },
    /// `claimer` takes the opposing seat against `host`.
    Claim {
        claimer: ParticipantId,
        host: ParticipantId,
    },
    /// `host` accepts `claimer`; seat assignment is fixed.
    Ack {
        host: ParticipantId,
        claimer: ParticipantId,
    },
    /// Dice settled for `seat`.
    Roll { seat: Seat, roll: Roll },
    /// `seat` moved `piece` by `steps` using `choice`.
    Move {
        seat: Seat,
        piece: PieceId,
        choice: DieChoice,
        steps: u8,
    },
    /// The acting seat is now `to`.
    TurnChange { to: Seat },
}

impl SyncEvent {
    /// Handshake messages, as opposed to mirrored game actions.
    #[must_use]
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            SyncEvent::Announce { .. } | SyncEvent::Claim { .. } | SyncEvent::Ack { .. }
        )
    }
}

/// A sequenced event from one sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub sender: ParticipantId,
    /// Per-sender sequence number, starting at 1.
    pub seq: u64,
    pub event: SyncEvent,
}

impl Envelope {
    #[must_use]
    pub fn new(sender: ParticipantId, seq: u64, event: SyncEvent) -> Self {
        Self { sender, seq, event }
    }

    /// Serialize for the transport.
    pub fn encode(&self) -> Result<Vec<u8>, SyncError> {
        Ok(bincode::serialize(self)?)
    }

    /// Parse a transport payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, SyncError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_event_roundtrip() {
        let envelope = Envelope::new(
            ParticipantId::new(3),
            12,
            SyncEvent::Move {
                seat: Seat::Yellow,
                piece: PieceId::new(Seat::Yellow, 2),
                choice: DieChoice::Sum,
                steps: 9,
            },
        );
        let bytes = envelope.encode().unwrap();
        assert_eq!(Envelope::decode(&bytes).unwrap(), envelope);
    }

    #[test]
    fn test_garbage_is_codec_error() {
        let err = Envelope::decode(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, SyncError::Codec(_)));
    }

    #[test]
    fn test_handshake_classification() {
        let p = ParticipantId::new(1);
        assert!(SyncEvent::Announce { participant: p }.is_handshake());
        assert!(!SyncEvent::TurnChange { to: Seat::Red }.is_handshake());
    }
}
