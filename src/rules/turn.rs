//! Turn/dice coordinator: who acts, what they rolled, which dice remain.
//!
//! ```text
//! AwaitingRoll ─request_roll─▶ Rolling ─settle_roll─▶ AwaitingMoveSelection
//!      ▲                                                  │ select_move
//!      │                                                  ▼
//!   advance ◀── TurnComplete { bonus } ◀─complete_move── ResolvingMove
//!                                                         │ (4th piece Home)
//!                                                         ▼
//!                                                      Finished
//! ```
//!
//! A turn completes once every usable die is consumed, or once no remaining
//! die (or the sum) admits a legal move. A double six or a capture marks the
//! turn for a bonus: the same seat rolls again instead of rotating.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{DieChoice, Roll, Seat};
use crate::pieces::{PieceId, PieceRegistry};

use super::engine::{self, MatchResult, MoveOutcome};
use super::MoveError;

/// Coordinator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    AwaitingRoll,
    Rolling,
    AwaitingMoveSelection,
    ResolvingMove { piece: PieceId, choice: DieChoice },
    TurnComplete { bonus: bool },
    Finished(MatchResult),
}

/// The acting seat's current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Acting seat.
    pub seat: Seat,
    /// Dice for this turn, once settled.
    pub roll: Option<Roll>,
    /// Per-die consumption flags.
    pub used: [bool; 2],
    /// Double six rolled or capture made this turn.
    pub bonus: bool,
    /// Turn serial, starts at 1 and grows on every rotation or renewal.
    pub number: u32,
}

impl Turn {
    fn new(seat: Seat, number: u32) -> Self {
        Self {
            seat,
            roll: None,
            // Nothing to consume until the dice settle.
            used: [true, true],
            bonus: false,
            number,
        }
    }

    /// Both dice consumed.
    #[must_use]
    pub fn all_used(&self) -> bool {
        self.used[0] && self.used[1]
    }

    fn consume(&mut self, choice: DieChoice) {
        self.mark(choice, true);
    }

    fn release(&mut self, choice: DieChoice) {
        self.mark(choice, false);
    }

    fn mark(&mut self, choice: DieChoice, value: bool) {
        for (index, used) in self.used.iter_mut().enumerate() {
            if choice.consumes(index) {
                *used = value;
            }
        }
    }
}

/// Where the turn stands after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The acting seat still has a die to play.
    AwaitingMove,
    /// The turn is over. `moved` is false when no legal move existed.
    TurnOver { bonus: bool, moved: bool },
    /// Someone brought all four pieces Home.
    MatchOver(MatchResult),
}

/// Turn/dice state machine for a two-seat match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCoordinator {
    seats: [Seat; 2],
    turn: Turn,
    phase: TurnPhase,
    /// A move was applied in the current turn.
    moved: bool,
}

impl TurnCoordinator {
    /// Start a match between two seats; `first` rolls first.
    #[must_use]
    pub fn new(seats: [Seat; 2], first: Seat) -> Self {
        Self {
            seats,
            turn: Turn::new(first, 1),
            phase: TurnPhase::AwaitingRoll,
            moved: false,
        }
    }

    /// Acting seat.
    #[must_use]
    pub fn seat(&self) -> Seat {
        self.turn.seat
    }

    /// Current turn.
    #[must_use]
    pub fn turn(&self) -> &Turn {
        &self.turn
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Participating seats.
    #[must_use]
    pub fn seats(&self) -> [Seat; 2] {
        self.seats
    }

    /// Result, once finished.
    #[must_use]
    pub fn result(&self) -> Option<MatchResult> {
        match self.phase {
            TurnPhase::Finished(result) => Some(result),
            _ => None,
        }
    }

    /// Is a roll or move animation in flight?
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            TurnPhase::Rolling | TurnPhase::ResolvingMove { .. } | TurnPhase::TurnComplete { .. }
        )
    }

    /// The seat after `seat` in fixed rotation order, among participants.
    #[must_use]
    pub fn next_seat(&self, seat: Seat) -> Seat {
        let mut next = seat.next();
        while !self.seats.contains(&next) {
            next = next.next();
        }
        next
    }

    fn check_seat(&self, seat: Seat) -> Result<(), MoveError> {
        if let TurnPhase::Finished(_) = self.phase {
            return Err(MoveError::MatchOver);
        }
        if seat != self.turn.seat {
            return Err(MoveError::NotYourTurn {
                seat,
                active: self.turn.seat,
            });
        }
        Ok(())
    }

    /// AwaitingRoll → Rolling.
    pub fn request_roll(&mut self, seat: Seat) -> Result<(), MoveError> {
        self.check_seat(seat)?;
        match self.phase {
            TurnPhase::AwaitingRoll => {
                self.phase = TurnPhase::Rolling;
                Ok(())
            }
            TurnPhase::AwaitingMoveSelection => Err(MoveError::NotAwaitingRoll),
            _ => Err(MoveError::Busy),
        }
    }

    /// Rolling → AwaitingMoveSelection, or straight to TurnComplete when no
    /// die admits a move.
    pub fn settle_roll(&mut self, roll: Roll, registry: &PieceRegistry) -> Result<Progress, MoveError> {
        if self.phase != TurnPhase::Rolling {
            return Err(MoveError::Busy);
        }
        self.turn.roll = Some(roll);
        self.turn.used = [false, false];
        self.turn.bonus = roll.is_double_six();
        debug!(seat = %self.turn.seat, %roll, bonus = self.turn.bonus, "dice settled");
        self.phase = TurnPhase::AwaitingMoveSelection;
        Ok(self.check_remaining(registry))
    }

    /// Validate a move request and consume its dice.
    ///
    /// AwaitingMoveSelection → ResolvingMove. Returns the step count.
    pub fn select_move(
        &mut self,
        seat: Seat,
        piece: PieceId,
        choice: DieChoice,
        registry: &PieceRegistry,
    ) -> Result<u8, MoveError> {
        self.check_seat(seat)?;
        match self.phase {
            TurnPhase::AwaitingMoveSelection => {}
            TurnPhase::AwaitingRoll => return Err(MoveError::NotAwaitingMove),
            _ => return Err(MoveError::Busy),
        }
        if piece.seat() != seat {
            return Err(MoveError::ForeignPiece { piece, seat });
        }
        let roll = self.turn.roll.ok_or(MoveError::NotAwaitingMove)?;
        if !engine::choice_available(choice, self.turn.used) {
            return Err(MoveError::DieUsed(choice));
        }
        let steps = roll.steps(choice);
        engine::validate_move(registry, piece, steps)?;

        self.turn.consume(choice);
        self.phase = TurnPhase::ResolvingMove { piece, choice };
        Ok(steps)
    }

    /// ResolvingMove → AwaitingMoveSelection, TurnComplete or Finished.
    pub fn complete_move(&mut self, outcome: &MoveOutcome, registry: &PieceRegistry) -> Progress {
        self.moved = true;
        if !outcome.captured.is_empty() {
            self.turn.bonus = true;
        }
        if outcome.seat_finished {
            let winner = outcome.piece.seat();
            let result = MatchResult {
                winner,
                loser: self.next_seat(winner),
            };
            info!(%winner, "match won");
            self.phase = TurnPhase::Finished(result);
            return Progress::MatchOver(result);
        }
        self.phase = TurnPhase::AwaitingMoveSelection;
        self.check_remaining(registry)
    }

    fn check_remaining(&mut self, registry: &PieceRegistry) -> Progress {
        let usable = match self.turn.roll {
            Some(roll) => {
                !self.turn.all_used()
                    && engine::has_legal_move(registry, self.turn.seat, roll, self.turn.used)
            }
            None => false,
        };
        if usable {
            return Progress::AwaitingMove;
        }
        let bonus = self.turn.bonus;
        self.phase = TurnPhase::TurnComplete { bonus };
        Progress::TurnOver {
            bonus,
            moved: self.moved,
        }
    }

    /// Give up the remaining dice: AwaitingMoveSelection → TurnComplete.
    ///
    /// Used when an AI seat cannot produce a move for a roll it was handed.
    pub fn forfeit(&mut self, registry: &PieceRegistry) -> Option<Progress> {
        if self.phase != TurnPhase::AwaitingMoveSelection {
            return None;
        }
        self.turn.used = [true, true];
        Some(self.check_remaining(registry))
    }

    /// TurnComplete → AwaitingRoll for the same seat (bonus) or the next.
    ///
    /// Returns the new acting seat, `None` if the turn is not complete.
    pub fn advance(&mut self) -> Option<Seat> {
        let TurnPhase::TurnComplete { bonus } = self.phase else {
            return None;
        };
        let next = if bonus {
            self.turn.seat
        } else {
            self.next_seat(self.turn.seat)
        };
        Some(self.begin_turn(next))
    }

    fn begin_turn(&mut self, seat: Seat) -> Seat {
        self.turn = Turn::new(seat, self.turn.number + 1);
        self.phase = TurnPhase::AwaitingRoll;
        self.moved = false;
        info!(%seat, turn = self.turn.number, "turn begins");
        seat
    }

    // === Trusted peer entry points ===
    //
    // Inbound peer events skip seat and phase gating; the peer already
    // validated them on its side.

    /// Hand the turn to `seat` (peer TurnChange). Ignored once finished.
    pub fn force_turn(&mut self, seat: Seat) -> bool {
        if self.result().is_some() {
            return false;
        }
        if self.phase == TurnPhase::AwaitingRoll && self.turn.seat == seat {
            return false;
        }
        self.begin_turn(seat);
        true
    }

    /// Apply a peer's settled roll for `seat`.
    ///
    /// Settles through the same path as a local roll, so a roll with no
    /// usable die completes the turn here too. `None` once finished.
    pub fn force_roll(&mut self, seat: Seat, roll: Roll, registry: &PieceRegistry) -> Option<Progress> {
        if self.result().is_some() {
            return None;
        }
        if self.turn.seat != seat {
            self.begin_turn(seat);
        }
        self.phase = TurnPhase::Rolling;
        self.settle_roll(roll, registry).ok()
    }

    /// Account for a peer's move that was already applied to `registry`.
    ///
    /// Dice are consumed only here, after the move took effect.
    pub fn force_move(&mut self, choice: DieChoice, outcome: &MoveOutcome, registry: &PieceRegistry) -> Progress {
        self.turn.consume(choice);
        self.complete_move(outcome, registry)
    }

    /// Roll a failed move back to AwaitingMoveSelection, returning its dice.
    pub fn abandon_move(&mut self) {
        if let TurnPhase::ResolvingMove { choice, .. } = self.phase {
            self.turn.release(choice);
            self.phase = TurnPhase::AwaitingMoveSelection;
        }
    }
}
