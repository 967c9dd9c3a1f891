//! # ludo-core
//!
//! Engine for a four-seat race game in the Ludo family.
//!
//! ## Design Principles
//!
//! 1. **One Geometry**: every seat's view of the board comes from a single
//!    parameterized mapping, rotated by seat. No per-seat tables.
//!
//! 2. **Rules Are Pure**: legality is a function of the registry and the
//!    dice; only the executor mutates piece positions.
//!
//! 3. **One Event Loop**: local commands, peer events and timers go through
//!    the same entry points, so local and mirrored play cannot diverge in
//!    handling.
//!
//! ## Architecture
//!
//! - **Injectable Randomness**: dice and tie-breaks come from a
//!   `RandomSource`; tests script exact rolls with `ScriptedDice`.
//!
//! - **Virtual Time**: animations and pauses are timers on a clock the
//!   host advances, so a whole match can run deterministically in a test.
//!
//! - **Persistent Data Structures**: O(1) registry clones via `im-rs` for
//!   snapshots and AI lookahead.
//!
//! ## Modules
//!
//! - `core`: seats, dice, actions, RNG, configuration
//! - `board`: track geometry, safe cells, grid coordinates
//! - `pieces`: the piece registry
//! - `rules`: move validation/execution and the turn coordinator
//! - `ai`: opponent strategies
//! - `sync`: peer events, transport and matchmaking
//! - `game`: the match event loop

pub mod core;
pub mod board;
pub mod pieces;
pub mod rules;
pub mod ai;
pub mod sync;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    Seat, SeatMap, SEAT_COUNT,
    GameRng, GameRngState, RandomSource, ScriptedDice,
    MatchConfig, Controller, StrategyKind, Timing, ConfigError,
    Action, ActionRecord, DieChoice, Roll,
};

pub use crate::board::{BoardError, Cell, PathIndex, Position, TrackOffset};

pub use crate::pieces::{Piece, PieceId, PieceRegistry};

pub use crate::rules::{
    can_move, execute_move, LegalMove, MatchResult, MoveError, MoveOutcome,
    Progress, TurnCoordinator, TurnPhase,
};

pub use crate::ai::{CapturePreferring, FirstFit, OpponentStrategy};

pub use crate::sync::{
    Envelope, LocalBus, Matchmaker, ParticipantId, Peer, SyncError, SyncEvent, Transport,
};

pub use crate::game::{Command, Match, MatchHost, MatchSnapshot, NullHost};
