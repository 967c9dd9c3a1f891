//! Dice rolls, die selection and the resolved-action history.
//!
//! A turn starts with a `Roll` of two independent dice. Each move selects
//! one die, the other, or their sum (`DieChoice`). Every resolved action is
//! appended to the match history as an `ActionRecord`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::rng::{RandomSource, DIE_FACES};
use super::seat::Seat;
use crate::pieces::PieceId;

/// Two die faces, each in `1..=6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Roll {
    dice: [u8; 2],
}

impl Roll {
    /// Build a roll from two faces, `None` if either is outside `1..=6`.
    ///
    /// ```
    /// use ludo_core::core::Roll;
    ///
    /// assert!(Roll::new(6, 3).is_some());
    /// assert!(Roll::new(0, 3).is_none());
    /// assert!(Roll::new(6, 6).unwrap().is_double_six());
    /// ```
    #[must_use]
    pub fn new(first: u8, second: u8) -> Option<Self> {
        let valid = |f: u8| (1..=DIE_FACES).contains(&f);
        (valid(first) && valid(second)).then_some(Self {
            dice: [first, second],
        })
    }

    /// Roll two dice from a random source.
    pub fn from_source(source: &mut dyn RandomSource) -> Self {
        let first = source.roll_die().clamp(1, DIE_FACES);
        let second = source.roll_die().clamp(1, DIE_FACES);
        Self {
            dice: [first, second],
        }
    }

    /// First die.
    #[must_use]
    pub const fn first(self) -> u8 {
        self.dice[0]
    }

    /// Second die.
    #[must_use]
    pub const fn second(self) -> u8 {
        self.dice[1]
    }

    /// Combined total.
    #[must_use]
    pub const fn sum(self) -> u8 {
        self.dice[0] + self.dice[1]
    }

    /// Both dice show six.
    #[must_use]
    pub const fn is_double_six(self) -> bool {
        self.dice[0] == DIE_FACES && self.dice[1] == DIE_FACES
    }

    /// Step count for a die choice.
    #[must_use]
    pub const fn steps(self, choice: DieChoice) -> u8 {
        match choice {
            DieChoice::First => self.first(),
            DieChoice::Second => self.second(),
            DieChoice::Sum => self.sum(),
        }
    }
}

impl std::fmt::Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.dice[0], self.dice[1])
    }
}

/// Which dice a move consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieChoice {
    First,
    Second,
    /// Both dice in one hop on one piece.
    Sum,
}

impl DieChoice {
    /// Single-die choices first, then the sum.
    pub const ALL: [DieChoice; 3] = [DieChoice::First, DieChoice::Second, DieChoice::Sum];

    /// Does this choice consume die `index` (0 or 1)?
    #[must_use]
    pub const fn consumes(self, index: usize) -> bool {
        match self {
            DieChoice::First => index == 0,
            DieChoice::Second => index == 1,
            DieChoice::Sum => true,
        }
    }
}

/// A resolved action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Dice settled.
    Roll(Roll),
    /// A piece moved.
    Move {
        piece: PieceId,
        choice: DieChoice,
        steps: u8,
        /// Opposing pieces sent back to Base.
        captured: SmallVec<[PieceId; 3]>,
    },
    /// No remaining die admitted a move; the turn was passed on.
    Pass,
    /// The acting seat changed (or renewed on a bonus).
    TurnChange { to: Seat },
}

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The seat that acted.
    pub seat: Seat,

    /// The action taken.
    pub action: Action,

    /// Turn number when the action was taken (starts at 1).
    pub turn: u32,

    /// Sequence number within the turn.
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(seat: Seat, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            seat,
            action,
            turn,
            sequence,
        }
    }
}
