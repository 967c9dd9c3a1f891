//! Move selection heuristics.
//!
//! - `FirstFit`: try the sum, then each die; first movable piece wins
//! - `CapturePreferring`: captures first, then the furthest advance

use crate::core::{DieChoice, RandomSource, Roll, Seat, StrategyKind};
use crate::pieces::PieceRegistry;
use crate::rules::{self, LegalMove};

/// Picks a move for a non-human seat.
pub trait OpponentStrategy: Send + Sync {
    /// Choose a move given the roll and consumed dice.
    ///
    /// Returns `None` if no remaining die (or the sum) admits a move.
    fn choose(
        &self,
        registry: &PieceRegistry,
        seat: Seat,
        roll: Roll,
        used: [bool; 2],
        rng: &mut dyn RandomSource,
    ) -> Option<LegalMove>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the strategy for a configured kind.
pub fn from_kind(kind: StrategyKind) -> Box<dyn OpponentStrategy> {
    match kind {
        StrategyKind::FirstFit => Box::new(FirstFit),
        StrategyKind::CapturePreferring => Box::new(CapturePreferring),
    }
}

/// Combined sum first, then the first die, then the second.
const FIRST_FIT_ORDER: [DieChoice; 3] = [DieChoice::Sum, DieChoice::First, DieChoice::Second];

/// Try the sum, then each die; pick the first owned piece that can move.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstFit;

impl OpponentStrategy for FirstFit {
    fn choose(
        &self,
        registry: &PieceRegistry,
        seat: Seat,
        roll: Roll,
        used: [bool; 2],
        _rng: &mut dyn RandomSource,
    ) -> Option<LegalMove> {
        FIRST_FIT_ORDER
            .into_iter()
            .filter(|&choice| rules::choice_available(choice, used))
            .find_map(|choice| {
                let steps = roll.steps(choice);
                registry
                    .pieces_of(seat)
                    .find(|p| rules::validate_move(registry, p.id, steps).is_ok())
                    .map(|p| LegalMove {
                        piece: p.id,
                        choice,
                        steps,
                    })
            })
    }

    fn name(&self) -> &'static str {
        "first-fit"
    }
}

/// Prefer moves that capture, then moves that advance furthest.
///
/// Equal-scoring moves are broken uniformly with the random source.
#[derive(Clone, Copy, Debug, Default)]
pub struct CapturePreferring;

impl CapturePreferring {
    /// (captures, landing path index) for a move, via a scratch registry.
    fn score(registry: &PieceRegistry, mv: &LegalMove) -> (usize, u8) {
        let mut scratch = registry.clone();
        match rules::execute_move(&mut scratch, mv.piece, mv.steps) {
            Ok(outcome) => {
                let landing = scratch
                    .get(mv.piece)
                    .and_then(|p| p.path_index())
                    .map_or(0, |path| path.get());
                (outcome.captured.len(), landing)
            }
            Err(_) => (0, 0),
        }
    }
}

impl OpponentStrategy for CapturePreferring {
    fn choose(
        &self,
        registry: &PieceRegistry,
        seat: Seat,
        roll: Roll,
        used: [bool; 2],
        rng: &mut dyn RandomSource,
    ) -> Option<LegalMove> {
        let moves = rules::legal_moves(registry, seat, roll, used);
        let scored: Vec<_> = moves
            .iter()
            .map(|mv| (Self::score(registry, mv), *mv))
            .collect();
        let best = scored.iter().map(|(score, _)| *score).max()?;

        let ties: Vec<LegalMove> = scored
            .into_iter()
            .filter(|(score, _)| *score == best)
            .map(|(_, mv)| mv)
            .collect();
        let idx = rng.below(ties.len() as u32) as usize;
        ties.get(idx).copied()
    }

    fn name(&self) -> &'static str {
        "capture-preferring"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{self, PathIndex, Position, TrackOffset};
    use crate::core::GameRng;
    use crate::pieces::PieceId;

    fn place(registry: &mut PieceRegistry, seat: Seat, slot: u8, path: u8) -> PieceId {
        let id = PieceId::new(seat, slot);
        registry.set_position(id, board::position_at(seat, PathIndex::new(path).unwrap()));
        id
    }

    #[test]
    fn test_first_fit_prefers_sum() {
        let mut registry = PieceRegistry::new();
        let id = place(&mut registry, Seat::Red, 0, 10);
        let roll = Roll::new(2, 3).unwrap();
        let mut rng = GameRng::new(0);

        let pick = FirstFit
            .choose(&registry, Seat::Red, roll, [false, false], &mut rng)
            .unwrap();
        assert_eq!(pick, LegalMove { piece: id, choice: DieChoice::Sum, steps: 5 });
    }

    #[test]
    fn test_first_fit_falls_back_to_single_die() {
        let registry = PieceRegistry::new();
        let roll = Roll::new(4, 6).unwrap();
        let mut rng = GameRng::new(0);

        let pick = FirstFit
            .choose(&registry, Seat::Yellow, roll, [false, false], &mut rng)
            .unwrap();
        assert_eq!(pick.choice, DieChoice::Second);
        assert_eq!(pick.piece, PieceId::new(Seat::Yellow, 0));
    }

    #[test]
    fn test_first_fit_skips_used_dice() {
        let mut registry = PieceRegistry::new();
        place(&mut registry, Seat::Red, 0, 10);
        let roll = Roll::new(2, 3).unwrap();
        let mut rng = GameRng::new(0);

        let pick = FirstFit
            .choose(&registry, Seat::Red, roll, [true, false], &mut rng)
            .unwrap();
        assert_eq!(pick.choice, DieChoice::Second);
    }

    #[test]
    fn test_no_move_returns_none() {
        let registry = PieceRegistry::new();
        let roll = Roll::new(4, 4).unwrap();
        let mut rng = GameRng::new(0);

        assert!(FirstFit.choose(&registry, Seat::Red, roll, [false, false], &mut rng).is_none());
        assert!(CapturePreferring
            .choose(&registry, Seat::Red, roll, [false, false], &mut rng)
            .is_none());
    }

    #[test]
    fn test_capture_preferring_takes_capture() {
        let mut registry = PieceRegistry::new();
        place(&mut registry, Seat::Yellow, 0, 2); // offset 42
        let hunter = place(&mut registry, Seat::Yellow, 1, 20); // offset 8
        registry.set_position(
            PieceId::new(Seat::Red, 0),
            Position::Track(TrackOffset::new(12).unwrap()),
        );
        let roll = Roll::new(4, 5).unwrap();
        let mut rng = GameRng::new(3);

        let pick = CapturePreferring
            .choose(&registry, Seat::Yellow, roll, [false, false], &mut rng)
            .unwrap();
        assert_eq!(pick.piece, hunter);
        assert_eq!(pick.choice, DieChoice::First);
    }

    #[test]
    fn test_capture_preferring_advances_furthest() {
        let mut registry = PieceRegistry::new();
        place(&mut registry, Seat::Blue, 0, 5);
        let lead = place(&mut registry, Seat::Blue, 1, 30);
        let roll = Roll::new(1, 2).unwrap();
        let mut rng = GameRng::new(0);

        let pick = CapturePreferring
            .choose(&registry, Seat::Blue, roll, [false, false], &mut rng)
            .unwrap();
        assert_eq!(pick, LegalMove { piece: lead, choice: DieChoice::Sum, steps: 3 });
    }

    #[test]
    fn test_from_kind() {
        assert_eq!(from_kind(StrategyKind::FirstFit).name(), "first-fit");
        assert_eq!(
            from_kind(StrategyKind::CapturePreferring).name(),
            "capture-preferring"
        );
    }
}
