//! Piece registry: mutable piece state.
//!
//! Each seat owns exactly four pieces for the whole match. Pieces start at
//! Base, move only through the executor in `rules`, and stay in the
//! registry after reaching Home.

pub mod registry;

pub use registry::{Piece, PieceId, PieceRegistry, PIECES_PER_SEAT};
