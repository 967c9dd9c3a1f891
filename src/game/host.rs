//! Notifications to the embedding application.
//!
//! The host owns balances and stakes; the engine only reports the outcome
//! from the local human seat's point of view.

/// Receives the match outcome.
pub trait MatchHost {
    /// The local seat won. The host pays out `payout_multiplier` times the stake.
    fn on_win(&mut self, payout_multiplier: u32);

    /// The local seat lost.
    fn on_lose(&mut self);
}

/// A host that ignores notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl MatchHost for NullHost {
    fn on_win(&mut self, _payout_multiplier: u32) {}

    fn on_lose(&mut self) {}
}

/// Outcome notifications received, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingHost {
    pub wins: Vec<u32>,
    pub losses: usize,
}

impl MatchHost for RecordingHost {
    fn on_win(&mut self, payout_multiplier: u32) {
        self.wins.push(payout_multiplier);
    }

    fn on_lose(&mut self) {
        self.losses += 1;
    }
}
