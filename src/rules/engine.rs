//! Move validation, execution and capture resolution.
//!
//! - `can_move`: the pure step-count rule for one piece
//! - `validate_move`: `can_move` plus the no-stacking rule, with a reason
//! - `execute_move`: advance a piece, then resolve captures
//!
//! Execution can also be driven one cell at a time (`step_once` then
//! `settle_move`) so the match loop can animate a move while the registry
//! stays consistent between steps.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::board::{self, PathIndex, Position, HOME_INDEX};
use crate::core::{DieChoice, Roll, Seat, DIE_FACES};
use crate::pieces::{Piece, PieceId, PieceRegistry, PIECES_PER_SEAT};

use super::MoveError;

/// Result of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: Seat,
    pub loser: Seat,
}

impl MatchResult {
    /// Did this seat win?
    #[must_use]
    pub fn is_winner(&self, seat: Seat) -> bool {
        self.winner == seat
    }
}

/// What a completed move did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub piece: PieceId,
    pub from: Position,
    pub to: Position,
    /// Opposing pieces sent back to Base.
    pub captured: SmallVec<[PieceId; 3]>,
    /// The mover's seat now has all four pieces Home.
    pub seat_finished: bool,
}

/// A move the acting seat could make right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegalMove {
    pub piece: PieceId,
    pub choice: DieChoice,
    pub steps: u8,
}

/// Can this piece advance by exactly `steps`?
///
/// True iff the piece is at Base and `steps == 6`, or it is on the track or
/// home stretch and its path index plus `steps` does not pass Home.
#[must_use]
pub fn can_move(piece: &Piece, steps: u8) -> bool {
    match piece.position {
        Position::Home => false,
        Position::Base => steps == DIE_FACES,
        _ => piece
            .path_index()
            .is_some_and(|path| path.get() as u16 + steps as u16 <= HOME_INDEX as u16),
    }
}

/// Path index a piece would land on, without checking legality.
fn destination(piece: &Piece, steps: u8) -> Result<PathIndex, MoveError> {
    if piece.is_at_base() {
        return Ok(PathIndex::ENTRY);
    }
    piece
        .path_index()
        .and_then(|path| path.advance(steps).ok())
        .ok_or(MoveError::Overshoot {
            piece: piece.id,
            steps,
        })
}

/// Why `can_move` said no.
fn rejection(piece: &Piece, steps: u8) -> MoveError {
    match piece.position {
        Position::Home => MoveError::PieceAtHome(piece.id),
        Position::Base => MoveError::NeedsSix {
            piece: piece.id,
            steps,
        },
        _ => MoveError::Overshoot {
            piece: piece.id,
            steps,
        },
    }
}

/// Check a move fully and return where the piece would land.
pub fn validate_move(
    registry: &PieceRegistry,
    id: PieceId,
    steps: u8,
) -> Result<PathIndex, MoveError> {
    let piece = registry.get(id).ok_or(MoveError::UnknownPiece(id.raw()))?;

    if !can_move(piece, steps) {
        return Err(rejection(piece, steps));
    }

    let target = destination(piece, steps)?;
    if !target.is_home() {
        let landing = board::position_at(piece.seat(), target);
        let blocked = registry
            .pieces_of(piece.seat())
            .any(|other| other.id != id && other.position == landing);
        if blocked {
            return Err(MoveError::BlockedByOwnPiece(id));
        }
    }

    Ok(target)
}

/// Number of animation hops for a move: one to leave Base, else one per cell.
#[must_use]
pub fn hop_count(piece: &Piece, steps: u8) -> u8 {
    if piece.is_at_base() {
        1
    } else {
        steps
    }
}

/// Advance a piece by one cell (or from Base onto its entry cell).
///
/// No capture resolution; call `settle_move` after the last step.
pub fn step_once(registry: &mut PieceRegistry, id: PieceId) -> Result<Position, MoveError> {
    let piece = *registry.get(id).ok_or(MoveError::UnknownPiece(id.raw()))?;
    if piece.is_finished() {
        return Err(MoveError::PieceAtHome(id));
    }
    let next = destination(&piece, 1)?;

    let position = board::position_at(piece.seat(), next);
    registry.set_position(id, position);
    debug!(piece = %id, path = next.get(), "step");
    Ok(position)
}

/// Resolve captures for a piece that just stopped moving.
///
/// Opposing pieces on the same non-safe shared offset go back to Base.
pub fn resolve_capture(registry: &mut PieceRegistry, mover: PieceId) -> SmallVec<[PieceId; 3]> {
    let mut captured = SmallVec::new();
    let Some(piece) = registry.get(mover) else {
        return captured;
    };
    let Some(offset) = piece.position.track_offset() else {
        return captured;
    };
    if offset.is_safe() {
        return captured;
    }

    let seat = piece.seat();
    captured.extend(
        registry
            .occupants(offset)
            .filter(|other| other.seat() != seat)
            .map(|other| other.id),
    );
    for &victim in &captured {
        registry.set_position(victim, Position::Base);
        info!(mover = %mover, victim = %victim, %offset, "capture");
    }
    captured
}

/// Finish a move that was stepped cell by cell.
pub fn settle_move(registry: &mut PieceRegistry, id: PieceId, from: Position) -> MoveOutcome {
    let captured = resolve_capture(registry, id);
    let to = registry.get(id).map_or(from, |p| p.position);
    MoveOutcome {
        piece: id,
        from,
        to,
        captured,
        seat_finished: is_winner(registry, id.seat()),
    }
}

/// Advance a piece by `steps` and resolve captures.
pub fn execute_move(
    registry: &mut PieceRegistry,
    id: PieceId,
    steps: u8,
) -> Result<MoveOutcome, MoveError> {
    validate_move(registry, id, steps)?;
    apply_unchecked(registry, id, steps)
}

/// Advance without the stacking check. Used for trusted peer moves.
///
/// Still refuses moves `can_move` rejects, since those have no landing cell.
pub fn apply_unchecked(
    registry: &mut PieceRegistry,
    id: PieceId,
    steps: u8,
) -> Result<MoveOutcome, MoveError> {
    let piece = *registry.get(id).ok_or(MoveError::UnknownPiece(id.raw()))?;
    if !can_move(&piece, steps) {
        return Err(rejection(&piece, steps));
    }
    let from = piece.position;
    for _ in 0..hop_count(&piece, steps) {
        step_once(registry, id)?;
    }
    Ok(settle_move(registry, id, from))
}

/// Has this seat brought all four pieces Home?
#[must_use]
pub fn is_winner(registry: &PieceRegistry, seat: Seat) -> bool {
    registry.count_finished(seat) == PIECES_PER_SEAT as usize
}

/// Every legal move for a seat given the roll and consumed dice.
#[must_use]
pub fn legal_moves(
    registry: &PieceRegistry,
    seat: Seat,
    roll: Roll,
    used: [bool; 2],
) -> SmallVec<[LegalMove; 12]> {
    let mut moves = SmallVec::new();
    for choice in DieChoice::ALL {
        if !choice_available(choice, used) {
            continue;
        }
        let steps = roll.steps(choice);
        for piece in registry.pieces_of(seat) {
            if validate_move(registry, piece.id, steps).is_ok() {
                moves.push(LegalMove {
                    piece: piece.id,
                    choice,
                    steps,
                });
            }
        }
    }
    moves
}

/// Does any remaining die (or the sum) admit a move?
#[must_use]
pub fn has_legal_move(registry: &PieceRegistry, seat: Seat, roll: Roll, used: [bool; 2]) -> bool {
    DieChoice::ALL.into_iter().any(|choice| {
        choice_available(choice, used)
            && registry
                .pieces_of(seat)
                .any(|p| validate_move(registry, p.id, roll.steps(choice)).is_ok())
    })
}

/// Can this choice still be taken? The sum needs both dice unconsumed.
#[must_use]
pub fn choice_available(choice: DieChoice, used: [bool; 2]) -> bool {
    match choice {
        DieChoice::First => !used[0],
        DieChoice::Second => !used[1],
        DieChoice::Sum => !used[0] && !used[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TrackOffset;

    fn place(registry: &mut PieceRegistry, seat: Seat, slot: u8, path: u8) -> PieceId {
        let id = PieceId::new(seat, slot);
        let pos = board::position_at(seat, PathIndex::new(path).unwrap());
        registry.set_position(id, pos);
        id
    }

    #[test]
    fn test_base_needs_six() {
        let registry = PieceRegistry::new();
        let piece = registry.get(PieceId::new(Seat::Yellow, 0)).unwrap();
        for steps in 1..=12 {
            assert_eq!(can_move(piece, steps), steps == 6, "steps {steps}");
        }
    }

    #[test]
    fn test_home_never_moves() {
        let mut registry = PieceRegistry::new();
        let id = place(&mut registry, Seat::Blue, 0, HOME_INDEX);
        let piece = registry.get(id).unwrap();
        for steps in 0..=12 {
            assert!(!can_move(piece, steps));
        }
        assert_eq!(
            validate_move(&registry, id, 1),
            Err(MoveError::PieceAtHome(id))
        );
    }

    #[test]
    fn test_home_stretch_exact_or_short() {
        let mut registry = PieceRegistry::new();
        let id = place(&mut registry, Seat::Red, 0, 53);
        let piece = *registry.get(id).unwrap();
        assert!(can_move(&piece, 4));
        assert!(!can_move(&piece, 5));

        let outcome = execute_move(&mut registry, id, 4).unwrap();
        assert_eq!(outcome.to, Position::Home);
    }

    #[test]
    fn test_enter_from_base() {
        let mut registry = PieceRegistry::new();
        let id = PieceId::new(Seat::Yellow, 0);
        let outcome = execute_move(&mut registry, id, 6).unwrap();
        assert_eq!(outcome.from, Position::Base);
        assert_eq!(outcome.to, Position::Track(board::entry_offset(Seat::Yellow)));
        assert!(outcome.captured.is_empty());
    }

    #[test]
    fn test_capture_on_plain_cell() {
        let mut registry = PieceRegistry::new();
        let mover = place(&mut registry, Seat::Yellow, 0, 2); // offset 42
        let victim = PieceId::new(Seat::Red, 1);
        registry.set_position(victim, Position::Track(TrackOffset::new(45).unwrap()));

        let outcome = execute_move(&mut registry, mover, 3).unwrap();
        assert_eq!(outcome.captured.as_slice(), &[victim]);
        assert!(registry.get(victim).unwrap().is_at_base());
    }

    #[test]
    fn test_no_capture_on_safe_cell() {
        let mut registry = PieceRegistry::new();
        let mover = place(&mut registry, Seat::Yellow, 0, 2); // offset 42
        let star = TrackOffset::new(48).unwrap();
        assert!(star.is_safe());
        let other = PieceId::new(Seat::Red, 0);
        registry.set_position(other, Position::Track(star));

        let outcome = execute_move(&mut registry, mover, 6).unwrap();
        assert!(outcome.captured.is_empty());
        assert_eq!(registry.occupants(star).count(), 2);
    }

    #[test]
    fn test_no_capture_in_home_stretch() {
        let mut registry = PieceRegistry::new();
        let mover = place(&mut registry, Seat::Blue, 0, 49);
        let outcome = execute_move(&mut registry, mover, 3).unwrap();
        assert_eq!(outcome.to, Position::HomeStretch(1));
        assert!(outcome.captured.is_empty());
    }

    #[test]
    fn test_stacking_blocked() {
        let mut registry = PieceRegistry::new();
        place(&mut registry, Seat::Green, 0, 10);
        let second = place(&mut registry, Seat::Green, 1, 7);
        assert_eq!(
            validate_move(&registry, second, 3),
            Err(MoveError::BlockedByOwnPiece(second))
        );
        assert!(validate_move(&registry, second, 4).is_ok());
    }

    #[test]
    fn test_home_accepts_many() {
        let mut registry = PieceRegistry::new();
        place(&mut registry, Seat::Green, 0, HOME_INDEX);
        let second = place(&mut registry, Seat::Green, 1, 55);
        assert!(execute_move(&mut registry, second, 2).is_ok());
        assert_eq!(registry.count_finished(Seat::Green), 2);
    }

    #[test]
    fn test_win_on_fourth_piece() {
        let mut registry = PieceRegistry::new();
        for slot in 0..3 {
            place(&mut registry, Seat::Red, slot, HOME_INDEX);
        }
        let last = place(&mut registry, Seat::Red, 3, 56);
        assert!(!is_winner(&registry, Seat::Red));

        let outcome = execute_move(&mut registry, last, 1).unwrap();
        assert!(outcome.seat_finished);
        assert!(is_winner(&registry, Seat::Red));
    }

    #[test]
    fn test_stepwise_matches_atomic() {
        let mut stepped = PieceRegistry::new();
        let id = place(&mut stepped, Seat::Blue, 0, 20);
        let mut atomic = stepped.clone();

        let from = stepped.get(id).unwrap().position;
        let mut last_path = 20;
        for _ in 0..5 {
            step_once(&mut stepped, id).unwrap();
            let path = stepped.get(id).unwrap().path_index().unwrap().get();
            assert_eq!(path, last_path + 1);
            last_path = path;
        }
        let stepped_outcome = settle_move(&mut stepped, id, from);
        let atomic_outcome = execute_move(&mut atomic, id, 5).unwrap();

        assert_eq!(stepped_outcome, atomic_outcome);
        assert_eq!(stepped, atomic);
    }

    #[test]
    fn test_legal_moves_respect_used_dice() {
        let mut registry = PieceRegistry::new();
        place(&mut registry, Seat::Yellow, 0, 10);
        let roll = Roll::new(2, 3).unwrap();

        let all = legal_moves(&registry, Seat::Yellow, roll, [false, false]);
        assert_eq!(all.len(), 3);

        let rest = legal_moves(&registry, Seat::Yellow, roll, [true, false]);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].choice, DieChoice::Second);

        assert!(!has_legal_move(&registry, Seat::Yellow, roll, [true, true]));
    }

    #[test]
    fn test_sum_of_three_and_three_leaves_base() {
        let registry = PieceRegistry::new();
        let roll = Roll::new(3, 3).unwrap();
        let moves = legal_moves(&registry, Seat::Red, roll, [false, false]);
        assert!(moves.iter().all(|m| m.choice == DieChoice::Sum));
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn test_apply_unchecked_allows_stacking() {
        let mut registry = PieceRegistry::new();
        place(&mut registry, Seat::Green, 0, 10);
        let second = place(&mut registry, Seat::Green, 1, 7);
        let outcome = apply_unchecked(&mut registry, second, 3).unwrap();
        assert_eq!(outcome.to, registry.get(PieceId::new(Seat::Green, 0)).unwrap().position);
        assert!(apply_unchecked(&mut registry, PieceId::new(Seat::Green, 2), 5).is_err());
    }
}
