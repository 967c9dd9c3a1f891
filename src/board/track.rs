//! Track geometry: seat-relative path indices, shared track offsets and
//! grid cells.
//!
//! All four seats share one parameterized geometry. Seat `k` enters the
//! shared loop at offset `1 + 13k`; its view of the board is the canonical
//! Blue view rotated `k` quarter turns clockwise about the center cell.
//!
//! ## Path index layout (per seat)
//!
//! - `0..=50`: shared track, 0 = entry cell, 50 = last cell before the exit
//! - `51..=56`: private home stretch
//! - `57`: Home

use serde::{Deserialize, Serialize};

use crate::core::Seat;

use super::BoardError;

/// Cells in the shared loop.
pub const TRACK_LEN: u8 = 52;
/// Cells in each private home stretch.
pub const HOME_STRETCH_LEN: u8 = 6;
/// Cells per quarter of the loop.
pub const ARM_LEN: u8 = 13;
/// Last path index on the shared track.
pub const LAST_SHARED_INDEX: u8 = 50;
/// Path index of the first home-stretch cell.
pub const HOME_STRETCH_START: u8 = LAST_SHARED_INDEX + 1;
/// Path index of Home.
pub const HOME_INDEX: u8 = HOME_STRETCH_START + HOME_STRETCH_LEN;
/// Cells along one side of the square grid.
pub const GRID_SIZE: u8 = 15;

/// Star cells sit this many cells past each seat's entry.
const STAR_DISTANCE: u8 = 8;

/// Shared offsets where capture is disallowed: four entries, four stars.
pub const SAFE_OFFSETS: [u8; 8] = [1, 9, 14, 22, 27, 35, 40, 48];

/// Canonical quarter of the loop for arm 0 (offsets 0..13), Blue's view.
const ARM: [(u8, u8); ARM_LEN as usize] = [
    (0, 6),
    (1, 6),
    (2, 6),
    (3, 6),
    (4, 6),
    (5, 6),
    (6, 5),
    (6, 4),
    (6, 3),
    (6, 2),
    (6, 1),
    (6, 0),
    (7, 0),
];

/// Blue's base slots; other seats are rotations of these.
const BASE_SLOTS: [(u8, u8); 4] = [(1, 1), (3, 1), (1, 3), (3, 3)];

const CENTER: Cell = Cell { x: 7, y: 7 };

/// Seat-relative unrolled progress, `0..=57`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathIndex(u8);

impl PathIndex {
    /// The seat's entry cell.
    pub const ENTRY: PathIndex = PathIndex(0);
    /// Home.
    pub const HOME: PathIndex = PathIndex(HOME_INDEX);

    /// Create a path index, failing outside `0..=57`.
    pub fn new(index: u8) -> Result<Self, BoardError> {
        if index > HOME_INDEX {
            return Err(BoardError::PathOutOfRange(index));
        }
        Ok(Self(index))
    }

    /// Get the raw index.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Is this index on the shared loop?
    #[must_use]
    pub const fn is_shared(self) -> bool {
        self.0 <= LAST_SHARED_INDEX
    }

    /// Is this index Home?
    #[must_use]
    pub const fn is_home(self) -> bool {
        self.0 == HOME_INDEX
    }

    /// Advance by `steps`, failing on overshoot past Home.
    pub fn advance(self, steps: u8) -> Result<Self, BoardError> {
        match self.0.checked_add(steps) {
            Some(index) => Self::new(index),
            None => Err(BoardError::PathOutOfRange(u8::MAX)),
        }
    }
}

/// Absolute offset on the shared loop, `0..52`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackOffset(u8);

impl TrackOffset {
    /// Create an offset, failing outside `0..52`.
    pub fn new(offset: u8) -> Result<Self, BoardError> {
        if offset >= TRACK_LEN {
            return Err(BoardError::OffsetOutOfRange(offset));
        }
        Ok(Self(offset))
    }

    /// Get the raw offset.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Is capture disallowed here?
    #[must_use]
    pub fn is_safe(self) -> bool {
        SAFE_OFFSETS.contains(&self.0)
    }
}

impl std::fmt::Display for TrackOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Track({})", self.0)
    }
}

/// Where a piece is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Waiting to enter; needs a six.
    #[default]
    Base,
    /// On the shared loop at an absolute offset.
    Track(TrackOffset),
    /// In the owner's home stretch, `0..6`.
    HomeStretch(u8),
    /// Finished.
    Home,
}

impl Position {
    /// The shared offset, if on the loop.
    #[must_use]
    pub fn track_offset(self) -> Option<TrackOffset> {
        match self {
            Position::Track(offset) => Some(offset),
            _ => None,
        }
    }
}

/// A cell on the 15×15 board grid. `x` grows right, `y` grows down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u8,
    pub y: u8,
}

impl Cell {
    /// Rotate a quarter turn clockwise about the center cell.
    #[must_use]
    const fn rotate(self) -> Cell {
        Cell {
            x: GRID_SIZE - 1 - self.y,
            y: self.x,
        }
    }

    /// Rotate `turns` quarter turns clockwise.
    #[must_use]
    fn rotated(self, turns: usize) -> Cell {
        (0..turns % 4).fold(self, |cell, _| cell.rotate())
    }
}

/// A seat's entry offset on the shared loop.
#[must_use]
pub fn entry_offset(seat: Seat) -> TrackOffset {
    TrackOffset(1 + ARM_LEN * seat.index() as u8)
}

/// A seat's star offset, eight cells past its entry.
#[must_use]
pub fn star_offset(seat: Seat) -> TrackOffset {
    TrackOffset((entry_offset(seat).0 + STAR_DISTANCE) % TRACK_LEN)
}

/// Shared offset for a path index, `None` in the home stretch or Home.
#[must_use]
pub fn track_offset(seat: Seat, path: PathIndex) -> Option<TrackOffset> {
    path.is_shared()
        .then(|| TrackOffset((entry_offset(seat).0 + path.0) % TRACK_LEN))
}

/// Position a seat's piece occupies at a path index.
#[must_use]
pub fn position_at(seat: Seat, path: PathIndex) -> Position {
    match track_offset(seat, path) {
        Some(offset) => Position::Track(offset),
        None if path.is_home() => Position::Home,
        None => Position::HomeStretch(path.0 - HOME_STRETCH_START),
    }
}

/// Path index of a seat's piece at a position; `None` at Base or for
/// positions the seat can never occupy.
#[must_use]
pub fn path_index(seat: Seat, position: Position) -> Option<PathIndex> {
    match position {
        Position::Base => None,
        Position::Track(offset) => {
            let rel = (offset.0 + TRACK_LEN - entry_offset(seat).0) % TRACK_LEN;
            (rel <= LAST_SHARED_INDEX).then_some(PathIndex(rel))
        }
        Position::HomeStretch(i) if i < HOME_STRETCH_LEN => Some(PathIndex(HOME_STRETCH_START + i)),
        Position::HomeStretch(_) => None,
        Position::Home => Some(PathIndex::HOME),
    }
}

/// Grid cell of a shared offset.
#[must_use]
pub fn track_cell(offset: TrackOffset) -> Cell {
    let (x, y) = ARM[(offset.0 % ARM_LEN) as usize];
    Cell { x, y }.rotated((offset.0 / ARM_LEN) as usize)
}

/// Grid cell for rendering a seat's piece. `slot` picks the Base slot.
#[must_use]
pub fn cell_of(seat: Seat, position: Position, slot: u8) -> Cell {
    let turns = seat.index();
    match position {
        Position::Base => {
            let (x, y) = BASE_SLOTS[(slot % 4) as usize];
            Cell { x, y }.rotated(turns)
        }
        Position::Track(offset) => track_cell(offset),
        Position::HomeStretch(i) => Cell {
            x: 1 + i.min(HOME_STRETCH_LEN - 1),
            y: 7,
        }
        .rotated(turns),
        Position::Home => CENTER,
    }
}

/// Grid cell of a seat's path index.
pub fn path_cell(seat: Seat, index: u8) -> Result<Cell, BoardError> {
    let path = PathIndex::new(index)?;
    Ok(cell_of(seat, position_at(seat, path), 0))
}
