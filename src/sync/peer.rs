//! A participant's view of the channel: sequencing outbound envelopes and
//! filtering inbound ones.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::channel::Transport;
use super::event::{Envelope, ParticipantId, SyncEvent};
use super::SyncError;

/// Transport plus identity and per-sender sequencing.
pub struct Peer {
    id: ParticipantId,
    transport: Box<dyn Transport>,
    next_seq: u64,
    last_seen: FxHashMap<ParticipantId, u64>,
}

impl Peer {
    pub fn new(id: ParticipantId, transport: Box<dyn Transport>) -> Self {
        Self {
            id,
            transport,
            next_seq: 1,
            last_seen: FxHashMap::default(),
        }
    }

    /// This participant.
    #[must_use]
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Publish one event.
    pub fn send(&mut self, event: SyncEvent) -> Result<(), SyncError> {
        let envelope = Envelope::new(self.id, self.next_seq, event);
        let bytes = envelope.encode()?;
        self.next_seq += 1;
        debug!(channel = self.transport.channel(), sender = %self.id, seq = envelope.seq, ?event, "send");
        self.transport.publish(bytes);
        Ok(())
    }

    /// Next usable inbound envelope.
    ///
    /// Undecodable payloads, echoes of our own envelopes and replays of an
    /// already-seen sequence number are logged and skipped.
    pub fn receive(&mut self) -> Option<Envelope> {
        while let Some(bytes) = self.transport.poll() {
            let envelope = match Envelope::decode(&bytes) {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!(receiver = %self.id, %err, "dropping undecodable payload");
                    continue;
                }
            };
            if envelope.sender == self.id {
                continue;
            }
            let last = self.last_seen.entry(envelope.sender).or_insert(0);
            if envelope.seq <= *last {
                warn!(sender = %envelope.sender, seq = envelope.seq, last = *last, "dropping stale envelope");
                continue;
            }
            *last = envelope.seq;
            return Some(envelope);
        }
        None
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("next_seq", &self.next_seq)
            .finish_non_exhaustive()
    }
}
