//! Board/track model: static per-seat geometry.
//!
//! Pure functions mapping a seat-relative path index to a shared track
//! offset, a `Position`, and a grid `Cell` for rendering, plus the set of
//! safe offsets where capture is disallowed. Nothing here has state.

pub mod track;

use thiserror::Error;

pub use track::{
    cell_of, entry_offset, path_cell, path_index, position_at, star_offset, track_cell,
    track_offset, Cell, PathIndex, Position, TrackOffset, GRID_SIZE, HOME_INDEX,
    HOME_STRETCH_LEN, HOME_STRETCH_START, LAST_SHARED_INDEX, SAFE_OFFSETS, TRACK_LEN,
};

/// Out-of-domain board coordinates.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("path index {0} is outside 0..=57")]
    PathOutOfRange(u8),
    #[error("track offset {0} is outside 0..52")]
    OffsetOutOfRange(u8),
}
