//! Game rules: move legality, move execution with capture, and the
//! turn/dice state machine.
//!
//! The coordinator decides *who* may act and *which* dice remain; the
//! engine decides *whether* a piece can move and performs the move.

pub mod engine;
pub mod turn;

use thiserror::Error;

use crate::core::{DieChoice, Seat};
use crate::pieces::PieceId;

pub use engine::{
    apply_unchecked, can_move, choice_available, execute_move, has_legal_move, hop_count,
    is_winner, legal_moves, resolve_capture, settle_move, step_once, validate_move, LegalMove,
    MatchResult, MoveOutcome,
};
pub use turn::{Progress, Turn, TurnCoordinator, TurnPhase};

/// A rejected roll or move request. Rejections never change state.
///
/// The display text doubles as the transient status message.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("It's {active}'s turn, not {seat}'s")]
    NotYourTurn { seat: Seat, active: Seat },
    #[error("Wait for the current move to finish")]
    Busy,
    #[error("Roll the dice first")]
    NotAwaitingMove,
    #[error("Use your dice before rolling again")]
    NotAwaitingRoll,
    #[error("That die is already used ({0:?})")]
    DieUsed(DieChoice),
    #[error("{piece} is not one of {seat}'s pieces")]
    ForeignPiece { piece: PieceId, seat: Seat },
    #[error("No piece with id {0}")]
    UnknownPiece(u8),
    #[error("{0} is already Home")]
    PieceAtHome(PieceId),
    #[error("{piece} needs a 6 to leave Base, not {steps}")]
    NeedsSix { piece: PieceId, steps: u8 },
    #[error("{piece} can't move {steps}: that passes Home")]
    Overshoot { piece: PieceId, steps: u8 },
    #[error("{0} would land on its own piece")]
    BlockedByOwnPiece(PieceId),
    #[error("The match is over")]
    MatchOver,
}
