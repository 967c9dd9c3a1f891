//! Read-only view of a match for rendering.

use serde::{Deserialize, Serialize};

use crate::board::{self, Cell, Position};
use crate::core::{Roll, Seat, SeatMap};
use crate::rules::{MatchResult, TurnPhase};

/// Everything a renderer needs, detached from the live match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Piece positions per seat, in slot order.
    pub positions: SeatMap<[Position; 4]>,
    /// Participating seats.
    pub seats: [Seat; 2],
    /// Acting seat.
    pub active_seat: Seat,
    pub phase: TurnPhase,
    /// Settled dice of the current turn.
    pub roll: Option<Roll>,
    /// Per-die consumption flags.
    pub used: [bool; 2],
    /// Faces shown while the dice tumble.
    pub tumble: Option<Roll>,
    /// Current status message.
    pub status: String,
    pub result: Option<MatchResult>,
    pub turn: u32,
    /// Virtual time in milliseconds.
    pub now_ms: u64,
}

impl MatchSnapshot {
    /// Grid cell of every piece.
    #[must_use]
    pub fn cells(&self) -> SeatMap<[Cell; 4]> {
        SeatMap::new(|seat| {
            let positions = self.positions[seat];
            let mut cells = [Cell { x: 0, y: 0 }; 4];
            for (slot, cell) in cells.iter_mut().enumerate() {
                *cell = board::cell_of(seat, positions[slot], slot as u8);
            }
            cells
        })
    }

    /// Pieces of `seat` already Home.
    #[must_use]
    pub fn finished(&self, seat: Seat) -> usize {
        self.positions[seat]
            .iter()
            .filter(|p| **p == Position::Home)
            .count()
    }
}
