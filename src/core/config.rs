//! Match configuration.
//!
//! Hosts configure a match at startup by providing:
//! - the two active seats and who drives each (`Controller`)
//! - animation and thinking delays (`Timing`)
//! - the payout multiplier reported on a win
//! - the RNG seed and the AI strategy
//!
//! Everything here is serializable so a host can load it from its own
//! settings store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::seat::Seat;

/// Who produces the input for a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    /// A human on this device. Accepts `Command`s.
    Local,
    /// The built-in opponent strategy, driven by timers.
    Ai,
    /// A peer mirrored over the sync channel.
    Remote,
}

/// Which opponent heuristic drives `Controller::Ai` seats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Sum first, then each die; first movable piece wins.
    #[default]
    FirstFit,
    /// Prefer captures, then the furthest advance; ties broken randomly.
    CapturePreferring,
}

/// Animation and pause lengths, in milliseconds of virtual time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Number of tumble frames before the dice settle.
    pub tumble_frames: u8,
    /// Minimum delay per tumble frame.
    pub tumble_min_ms: u64,
    /// Maximum delay per tumble frame (inclusive).
    pub tumble_max_ms: u64,
    /// Delay per cell of stepwise piece advancement.
    pub step_ms: u64,
    /// Pause before a turn with no legal move is passed on.
    pub no_move_ms: u64,
    /// Pause between a completed turn and the next seat's turn.
    pub rotate_ms: u64,
    /// AI "thinking" pause before it rolls.
    pub ai_think_ms: u64,
    /// AI pause between the roll and each move.
    pub ai_move_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tumble_frames: 6,
            tumble_min_ms: 80,
            tumble_max_ms: 120,
            step_ms: 150,
            no_move_ms: 1000,
            rotate_ms: 1000,
            ai_think_ms: 800,
            ai_move_ms: 800,
        }
    }
}

impl Timing {
    /// Zero-length delays everywhere; timers still fire in order.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            tumble_frames: 1,
            tumble_min_ms: 0,
            tumble_max_ms: 0,
            step_ms: 0,
            no_move_ms: 0,
            rotate_ms: 0,
            ai_think_ms: 0,
            ai_move_ms: 0,
        }
    }
}

/// One participating seat and its controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSetup {
    pub seat: Seat,
    pub controller: Controller,
}

/// Reasons a configuration cannot start a match.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("both active seats are {0}")]
    DuplicateSeat(Seat),
    #[error("first seat {0} is not an active seat")]
    InactiveFirstSeat(Seat),
    #[error("tumble delay range is empty ({min} > {max})")]
    InvalidTumbleRange { min: u64, max: u64 },
    #[error("at most one seat may be remote")]
    TooManyRemoteSeats,
}

/// Complete match configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// The two participating seats.
    pub seats: [SeatSetup; 2],

    /// Seat that rolls first.
    pub first_seat: Seat,

    /// Animation and pause lengths.
    pub timing: Timing,

    /// Multiplier passed to the host's payout callback on a win.
    pub payout_multiplier: u32,

    /// Seed for the default random source.
    pub seed: u64,

    /// Heuristic used by `Controller::Ai` seats.
    pub strategy: StrategyKind,

    /// Hand the remote seat to the AI if no peer shows up in time.
    pub ai_fallback_after_ms: Option<u64>,
}

impl MatchConfig {
    /// A human at `local` against the AI at `opponent`; `local` rolls first.
    pub fn new(local: Seat, opponent: Seat) -> Self {
        Self {
            seats: [
                SeatSetup {
                    seat: local,
                    controller: Controller::Local,
                },
                SeatSetup {
                    seat: opponent,
                    controller: Controller::Ai,
                },
            ],
            first_seat: local,
            timing: Timing::default(),
            payout_multiplier: 2,
            seed: 0,
            strategy: StrategyKind::default(),
            ai_fallback_after_ms: None,
        }
    }

    /// Set the controller of an active seat. Inactive seats are ignored.
    #[must_use]
    pub fn with_controller(mut self, seat: Seat, controller: Controller) -> Self {
        for setup in &mut self.seats {
            if setup.seat == seat {
                setup.controller = controller;
            }
        }
        self
    }

    /// Set the first seat to roll.
    #[must_use]
    pub fn with_first_seat(mut self, seat: Seat) -> Self {
        self.first_seat = seat;
        self
    }

    /// Set the timing table.
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the payout multiplier.
    #[must_use]
    pub fn with_payout_multiplier(mut self, multiplier: u32) -> Self {
        self.payout_multiplier = multiplier;
        self
    }

    /// Set the AI strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable the AI fallback for matchmaking.
    #[must_use]
    pub fn with_ai_fallback_after(mut self, ms: u64) -> Self {
        self.ai_fallback_after_ms = Some(ms);
        self
    }

    /// Check the configuration can start a match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [a, b] = self.seats;
        if a.seat == b.seat {
            return Err(ConfigError::DuplicateSeat(a.seat));
        }
        if !self.is_active(self.first_seat) {
            return Err(ConfigError::InactiveFirstSeat(self.first_seat));
        }
        if self.timing.tumble_min_ms > self.timing.tumble_max_ms {
            return Err(ConfigError::InvalidTumbleRange {
                min: self.timing.tumble_min_ms,
                max: self.timing.tumble_max_ms,
            });
        }
        if a.controller == Controller::Remote && b.controller == Controller::Remote {
            return Err(ConfigError::TooManyRemoteSeats);
        }
        Ok(())
    }

    /// Is this seat one of the two participants?
    #[must_use]
    pub fn is_active(&self, seat: Seat) -> bool {
        self.seats.iter().any(|s| s.seat == seat)
    }

    /// Active seats in configuration order.
    pub fn active_seats(&self) -> impl Iterator<Item = Seat> + '_ {
        self.seats.iter().map(|s| s.seat)
    }

    /// Controller for a seat, `None` if the seat is not active.
    #[must_use]
    pub fn controller(&self, seat: Seat) -> Option<Controller> {
        self.seats
            .iter()
            .find(|s| s.seat == seat)
            .map(|s| s.controller)
    }

    /// The first seat driven locally by a human, if any.
    #[must_use]
    pub fn local_seat(&self) -> Option<Seat> {
        self.seats
            .iter()
            .find(|s| s.controller == Controller::Local)
            .map(|s| s.seat)
    }

    /// The seat mirrored from a peer, if any.
    #[must_use]
    pub fn remote_seat(&self) -> Option<Seat> {
        self.seats
            .iter()
            .find(|s| s.controller == Controller::Remote)
            .map(|s| s.seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_match() {
        let config = MatchConfig::new(Seat::Yellow, Seat::Red);

        assert_eq!(config.first_seat, Seat::Yellow);
        assert_eq!(config.controller(Seat::Yellow), Some(Controller::Local));
        assert_eq!(config.controller(Seat::Red), Some(Controller::Ai));
        assert_eq!(config.controller(Seat::Blue), None);
        assert_eq!(config.payout_multiplier, 2);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_builder() {
        let config = MatchConfig::new(Seat::Blue, Seat::Green)
            .with_controller(Seat::Green, Controller::Remote)
            .with_first_seat(Seat::Green)
            .with_seed(9)
            .with_payout_multiplier(3)
            .with_ai_fallback_after(30_000);

        assert_eq!(config.remote_seat(), Some(Seat::Green));
        assert_eq!(config.local_seat(), Some(Seat::Blue));
        assert_eq!(config.first_seat, Seat::Green);
        assert_eq!(config.seed, 9);
        assert_eq!(config.payout_multiplier, 3);
        assert_eq!(config.ai_fallback_after_ms, Some(30_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_seat() {
        let config = MatchConfig::new(Seat::Red, Seat::Red);
        assert_eq!(config.validate(), Err(ConfigError::DuplicateSeat(Seat::Red)));
    }

    #[test]
    fn test_validate_inactive_first_seat() {
        let config = MatchConfig::new(Seat::Yellow, Seat::Red).with_first_seat(Seat::Blue);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InactiveFirstSeat(Seat::Blue))
        );
    }

    #[test]
    fn test_validate_tumble_range() {
        let mut timing = Timing::default();
        timing.tumble_min_ms = 200;
        timing.tumble_max_ms = 100;
        let config = MatchConfig::new(Seat::Yellow, Seat::Red).with_timing(timing);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTumbleRange { .. })
        ));
    }

    #[test]
    fn test_config_serde() {
        let config = MatchConfig::new(Seat::Yellow, Seat::Red).with_strategy(StrategyKind::CapturePreferring);
        let json = serde_json::to_string(&config).unwrap();
        let back: MatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
