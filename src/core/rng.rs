//! Injectable random sources for die faces, AI tie-breaks and animation jitter.
//!
//! ## Key Features
//!
//! - **Injectable**: the match only sees `dyn RandomSource`
//! - **Deterministic**: same seed produces identical rolls
//! - **Serializable**: `GameRng` state can be captured and restored in O(1)
//! - **Scriptable**: `ScriptedDice` replays fixed faces for tests and replays
//!
//! ```
//! use ludo_core::core::{GameRng, RandomSource, ScriptedDice};
//!
//! let mut dice = ScriptedDice::new([6, 3], 42);
//! assert_eq!(dice.roll_die(), 6);
//! assert_eq!(dice.roll_die(), 3);
//!
//! // Exhausted scripts fall back to the seeded generator
//! let face = dice.roll_die();
//! assert!((1..=6).contains(&face));
//! ```

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Faces per die.
pub const DIE_FACES: u8 = 6;

/// A uniform random source.
pub trait RandomSource {
    /// Roll one die: uniform in `1..=6`.
    fn roll_die(&mut self) -> u8;

    /// Uniform integer in `0..bound`. `bound` must be non-zero.
    fn below(&mut self, bound: u32) -> u32;
}

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl RandomSource for GameRng {
    fn roll_die(&mut self) -> u8 {
        self.inner.gen_range(1..=DIE_FACES)
    }

    fn below(&mut self, bound: u32) -> u32 {
        self.inner.gen_range(0..bound)
    }
}

/// Serializable RNG state for checkpointing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

/// Replays a fixed sequence of die faces, then defers to a seeded `GameRng`.
///
/// Only die faces are scripted; `below` always uses the fallback generator.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
    fallback: GameRng,
}

impl ScriptedDice {
    /// Create a script. Faces outside `1..=6` are clamped into range.
    pub fn new(faces: impl IntoIterator<Item = u8>, seed: u64) -> Self {
        Self {
            faces: faces
                .into_iter()
                .map(|f| f.clamp(1, DIE_FACES))
                .collect(),
            fallback: GameRng::new(seed),
        }
    }

    /// Append more faces to the script.
    pub fn push_faces(&mut self, faces: impl IntoIterator<Item = u8>) {
        self.faces
            .extend(faces.into_iter().map(|f| f.clamp(1, DIE_FACES)));
    }

    /// Faces not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl RandomSource for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        self.faces
            .pop_front()
            .unwrap_or_else(|| self.fallback.roll_die())
    }

    fn below(&mut self, bound: u32) -> u32 {
        self.fallback.below(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.roll_die(), rng2.roll_die());
        }
    }

    #[test]
    fn test_faces_in_range() {
        let mut rng = GameRng::new(7);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let face = rng.roll_die();
            assert!((1..=6).contains(&face));
            seen[(face - 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every face should appear in 600 rolls");
    }

    #[test]
    fn test_below_bound() {
        let mut rng = GameRng::new(3);
        for _ in 0..100 {
            assert!(rng.below(5) < 5);
        }
    }

    #[test]
    fn test_state_restore() {
        let mut rng = GameRng::new(42);
        for _ in 0..50 {
            rng.roll_die();
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.roll_die()).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.roll_die()).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let state = GameRngState {
            seed: 42,
            word_pos: 12345,
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: GameRngState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }

    #[test]
    fn test_scripted_then_fallback() {
        let mut dice = ScriptedDice::new([4, 4, 9, 0], 1);
        assert_eq!(dice.remaining(), 4);
        assert_eq!(dice.roll_die(), 4);
        assert_eq!(dice.roll_die(), 4);
        assert_eq!(dice.roll_die(), 6); // clamped
        assert_eq!(dice.roll_die(), 1); // clamped
        assert_eq!(dice.remaining(), 0);

        let mut reference = GameRng::new(1);
        assert_eq!(dice.roll_die(), reference.roll_die());
    }
}
