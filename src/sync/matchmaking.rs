//! Seat assignment handshake.
//!
//! ```text
//! A: Announce{A}            ──▶ B (searching)
//! B: Claim{claimer B, host A} ──▶ A
//! A: Ack{host A, claimer B}   ──▶ B     A hosts, B is the guest
//! ```
//!
//! The host takes the first configured seat and rolls first; the guest takes
//! the opposing seat. When two searching participants claim each other, the
//! one with the lower id hosts. A claim reaching a host that is already
//! matched is a protocol anomaly: it is logged and ignored.
//!
//! Announcements are repeated while searching, since the channel keeps no
//! history for late subscribers. If configured, a participant still
//! unmatched after the fallback timeout plays the AI instead.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{Controller, MatchConfig, Seat, SeatSetup};

use super::event::{Envelope, ParticipantId, SyncEvent};
use super::peer::Peer;
use super::SyncError;

/// Default interval between repeated announcements.
pub const ANNOUNCE_INTERVAL_MS: u64 = 2000;

/// How this participant ended up in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Accepted a claim; plays the first seat.
    Host,
    /// Claim accepted by a host; plays the opposing seat.
    Guest,
    /// No peer in time; the opposing seat is played by the AI.
    Solo,
}

/// Fixed seat assignment for a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub role: Role,
    pub local_seat: Seat,
    pub remote_seat: Seat,
    pub peer: Option<ParticipantId>,
}

impl Assignment {
    /// Seat that rolls first.
    #[must_use]
    pub fn first_seat(&self) -> Seat {
        match self.role {
            Role::Host | Role::Solo => self.local_seat,
            Role::Guest => self.remote_seat,
        }
    }

    /// Apply this assignment to a match configuration.
    #[must_use]
    pub fn configure(&self, template: MatchConfig) -> MatchConfig {
        let opponent = match self.role {
            Role::Solo => Controller::Ai,
            Role::Host | Role::Guest => Controller::Remote,
        };
        MatchConfig {
            seats: [
                SeatSetup {
                    seat: self.local_seat,
                    controller: Controller::Local,
                },
                SeatSetup {
                    seat: self.remote_seat,
                    controller: opponent,
                },
            ],
            first_seat: self.first_seat(),
            ..template
        }
    }
}

/// Handshake progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchmakingState {
    Idle,
    Searching,
    /// Claimed `host`'s announcement, waiting for its ack.
    Claiming { host: ParticipantId },
    Matched(Assignment),
}

/// Drives the handshake for one participant.
#[derive(Clone, Debug)]
pub struct Matchmaker {
    seats: [Seat; 2],
    state: MatchmakingState,
    waited_ms: u64,
    since_announce_ms: u64,
    announce_interval_ms: u64,
    fallback_after_ms: Option<u64>,
}

impl Matchmaker {
    /// `host_seat` goes to the host, `guest_seat` to the claimer.
    #[must_use]
    pub fn new(host_seat: Seat, guest_seat: Seat) -> Self {
        Self {
            seats: [host_seat, guest_seat],
            state: MatchmakingState::Idle,
            waited_ms: 0,
            since_announce_ms: 0,
            announce_interval_ms: ANNOUNCE_INTERVAL_MS,
            fallback_after_ms: None,
        }
    }

    /// Seats and fallback from a match configuration.
    #[must_use]
    pub fn from_config(config: &MatchConfig) -> Self {
        let [host, guest] = config.seats;
        let mut matchmaker = Self::new(host.seat, guest.seat);
        matchmaker.fallback_after_ms = config.ai_fallback_after_ms;
        matchmaker
    }

    /// Play the AI if unmatched after `ms`.
    #[must_use]
    pub fn with_fallback_after(mut self, ms: u64) -> Self {
        self.fallback_after_ms = Some(ms);
        self
    }

    /// Repeat the announcement every `ms` while searching.
    #[must_use]
    pub fn with_announce_interval(mut self, ms: u64) -> Self {
        self.announce_interval_ms = ms.max(1);
        self
    }

    #[must_use]
    pub fn state(&self) -> MatchmakingState {
        self.state
    }

    /// The assignment, once matched.
    #[must_use]
    pub fn assignment(&self) -> Option<Assignment> {
        match self.state {
            MatchmakingState::Matched(assignment) => Some(assignment),
            _ => None,
        }
    }

    /// Announce presence and start searching.
    pub fn enter(&mut self, peer: &mut Peer) -> Result<(), SyncError> {
        if let MatchmakingState::Matched(_) = self.state {
            return Err(SyncError::AlreadyMatched);
        }
        peer.send(SyncEvent::Announce {
            participant: peer.id(),
        })?;
        self.state = MatchmakingState::Searching;
        self.waited_ms = 0;
        self.since_announce_ms = 0;
        info!(participant = %peer.id(), "searching for an opponent");
        Ok(())
    }

    /// Process inbound traffic, then let `elapsed_ms` pass.
    ///
    /// Returns the assignment on the call that fixes it.
    pub fn tick(&mut self, peer: &mut Peer, elapsed_ms: u64) -> Result<Option<Assignment>, SyncError> {
        while let Some(envelope) = peer.receive() {
            match self.handle(peer, &envelope) {
                Ok(Some(assignment)) => return Ok(Some(assignment)),
                Ok(None) => {}
                Err(SyncError::DuplicateClaim { claimer }) => {
                    warn!(%claimer, "ignoring duplicate seat claim");
                }
                Err(err) => return Err(err),
            }
        }

        match self.state {
            MatchmakingState::Searching | MatchmakingState::Claiming { .. } => {}
            MatchmakingState::Idle | MatchmakingState::Matched(_) => return Ok(None),
        }

        self.waited_ms += elapsed_ms;
        self.since_announce_ms += elapsed_ms;

        if let Some(limit) = self.fallback_after_ms {
            if self.waited_ms >= limit {
                return Ok(Some(self.fall_back(peer.id())));
            }
        }

        if self.since_announce_ms >= self.announce_interval_ms {
            self.since_announce_ms = 0;
            if let MatchmakingState::Claiming { host } = self.state {
                debug!(%host, "claim unanswered, searching again");
            }
            self.state = MatchmakingState::Searching;
            peer.send(SyncEvent::Announce {
                participant: peer.id(),
            })?;
        }
        Ok(None)
    }

    /// Apply one inbound envelope.
    pub fn handle(&mut self, peer: &mut Peer, envelope: &Envelope) -> Result<Option<Assignment>, SyncError> {
        let me = peer.id();
        match envelope.event {
            SyncEvent::Announce { participant } => {
                if participant != me && self.state == MatchmakingState::Searching {
                    peer.send(SyncEvent::Claim {
                        claimer: me,
                        host: participant,
                    })?;
                    self.state = MatchmakingState::Claiming { host: participant };
                }
                Ok(None)
            }
            SyncEvent::Claim { claimer, host } => {
                if host != me {
                    return Ok(None);
                }
                match self.state {
                    MatchmakingState::Searching => self.accept(peer, claimer).map(Some),
                    // Crossed claims: the lower id hosts.
                    MatchmakingState::Claiming { host: target } if target == claimer => {
                        if me < claimer {
                            self.accept(peer, claimer).map(Some)
                        } else {
                            Ok(None)
                        }
                    }
                    MatchmakingState::Matched(assignment) if assignment.peer == Some(claimer) => {
                        // The guest may have missed our ack.
                        peer.send(SyncEvent::Ack { host: me, claimer })?;
                        Ok(None)
                    }
                    MatchmakingState::Matched(_) => Err(SyncError::DuplicateClaim { claimer }),
                    MatchmakingState::Idle | MatchmakingState::Claiming { .. } => Ok(None),
                }
            }
            SyncEvent::Ack { host, claimer } => match self.state {
                MatchmakingState::Claiming { .. } | MatchmakingState::Searching if claimer == me => {
                    let assignment = Assignment {
                        role: Role::Guest,
                        local_seat: self.seats[1],
                        remote_seat: self.seats[0],
                        peer: Some(host),
                    };
                    self.state = MatchmakingState::Matched(assignment);
                    info!(%host, seat = %assignment.local_seat, "matched as guest");
                    Ok(Some(assignment))
                }
                MatchmakingState::Claiming { host: target } if target == host => {
                    debug!(%host, winner = %claimer, "lost the claim race");
                    self.state = MatchmakingState::Searching;
                    Ok(None)
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn accept(&mut self, peer: &mut Peer, claimer: ParticipantId) -> Result<Assignment, SyncError> {
        peer.send(SyncEvent::Ack {
            host: peer.id(),
            claimer,
        })?;
        let assignment = Assignment {
            role: Role::Host,
            local_seat: self.seats[0],
            remote_seat: self.seats[1],
            peer: Some(claimer),
        };
        self.state = MatchmakingState::Matched(assignment);
        info!(%claimer, seat = %assignment.local_seat, "matched as host");
        Ok(assignment)
    }

    fn fall_back(&mut self, me: ParticipantId) -> Assignment {
        let assignment = Assignment {
            role: Role::Solo,
            local_seat: self.seats[0],
            remote_seat: self.seats[1],
            peer: None,
        };
        self.state = MatchmakingState::Matched(assignment);
        info!(participant = %me, waited_ms = self.waited_ms, "no opponent found, playing the AI");
        assignment
    }
}
