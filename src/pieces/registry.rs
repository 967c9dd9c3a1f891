//! Piece registry: the mutable position of every piece.
//!
//! The registry performs no legality checks; it trusts its caller (the
//! move executor). `set_position` is the only way a position changes.
//!
//! Backed by `im::Vector` so snapshots and AI lookahead clone in O(1).

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::board::{self, PathIndex, Position, TrackOffset};
use crate::core::{Seat, SeatMap};

/// Pieces owned by each seat.
pub const PIECES_PER_SEAT: u8 = 4;

/// Identifier of one of the sixteen pieces: `seat * 4 + slot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u8);

impl PieceId {
    /// Create the id for a seat's piece. `slot` is taken modulo 4.
    ///
    /// ```
    /// use ludo_core::core::Seat;
    /// use ludo_core::pieces::PieceId;
    ///
    /// let id = PieceId::new(Seat::Red, 2);
    /// assert_eq!(id.seat(), Seat::Red);
    /// assert_eq!(id.slot(), 2);
    /// ```
    #[must_use]
    pub const fn new(seat: Seat, slot: u8) -> Self {
        Self(seat as u8 * PIECES_PER_SEAT + slot % PIECES_PER_SEAT)
    }

    /// Parse a raw id, `None` outside `0..16`.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        if raw < PIECES_PER_SEAT * 4 {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Get the raw id.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Owning seat.
    #[must_use]
    pub fn seat(self) -> Seat {
        // Raw ids are always < 16, so the seat index is < 4.
        Seat::ALL[(self.0 / PIECES_PER_SEAT) as usize]
    }

    /// Slot within the owning seat, `0..4`.
    #[must_use]
    pub const fn slot(self) -> u8 {
        self.0 % PIECES_PER_SEAT
    }

    /// All four ids owned by a seat.
    pub fn all_of(seat: Seat) -> impl Iterator<Item = PieceId> {
        (0..PIECES_PER_SEAT).map(move |slot| PieceId::new(seat, slot))
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.seat(), self.slot())
    }
}

/// A piece and where it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub position: Position,
}

impl Piece {
    /// Owning seat.
    #[must_use]
    pub fn seat(&self) -> Seat {
        self.id.seat()
    }

    /// Has this piece reached Home?
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position == Position::Home
    }

    /// Is this piece still at Base?
    #[must_use]
    pub fn is_at_base(&self) -> bool {
        self.position == Position::Base
    }

    /// Seat-relative progress, `None` at Base.
    #[must_use]
    pub fn path_index(&self) -> Option<PathIndex> {
        board::path_index(self.seat(), self.position)
    }
}

/// Positions of all sixteen pieces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRegistry {
    pieces: Vector<Piece>,
}

impl Default for PieceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceRegistry {
    /// Every piece at Base.
    #[must_use]
    pub fn new() -> Self {
        let pieces = Seat::ALL
            .into_iter()
            .flat_map(PieceId::all_of)
            .map(|id| Piece {
                id,
                position: Position::Base,
            })
            .collect();
        Self { pieces }
    }

    /// Look up a piece.
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.raw() as usize)
    }

    /// Pieces owned by a seat, in slot order.
    pub fn pieces_of(&self, seat: Seat) -> impl Iterator<Item = &Piece> {
        let start = seat.index() * PIECES_PER_SEAT as usize;
        self.pieces
            .iter()
            .skip(start)
            .take(PIECES_PER_SEAT as usize)
    }

    /// All pieces.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Move a piece. Returns the previous position, `None` for an unknown id.
    pub fn set_position(&mut self, id: PieceId, position: Position) -> Option<Position> {
        let piece = self.pieces.get_mut(id.raw() as usize)?;
        let previous = piece.position;
        piece.position = position;
        Some(previous)
    }

    /// Number of a seat's pieces at Home.
    #[must_use]
    pub fn count_finished(&self, seat: Seat) -> usize {
        self.pieces_of(seat).filter(|p| p.is_finished()).count()
    }

    /// Pieces on a shared offset, any seat.
    pub fn occupants(&self, offset: TrackOffset) -> impl Iterator<Item = &Piece> {
        self.pieces
            .iter()
            .filter(move |p| p.position == Position::Track(offset))
    }

    /// Positions per seat, in slot order.
    #[must_use]
    pub fn positions(&self) -> SeatMap<[Position; 4]> {
        SeatMap::new(|seat| {
            let mut out = [Position::Base; 4];
            for (slot, piece) in self.pieces_of(seat).enumerate() {
                out[slot] = piece.position;
            }
            out
        })
    }
}
