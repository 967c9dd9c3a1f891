//! Opponent strategies for AI-controlled seats.
//!
//! A strategy only picks a move; the match loop rolls, schedules the
//! thinking pauses and applies the move through the same coordinator a
//! human goes through, so bonus and rotation rules are identical.
//!
//! ```
//! use ludo_core::ai::{FirstFit, OpponentStrategy};
//! use ludo_core::core::{DieChoice, GameRng, Roll, Seat};
//! use ludo_core::pieces::PieceRegistry;
//!
//! let registry = PieceRegistry::new();
//! let roll = Roll::new(6, 2).unwrap();
//! let mut rng = GameRng::new(1);
//!
//! let pick = FirstFit.choose(&registry, Seat::Red, roll, [false, false], &mut rng);
//! assert_eq!(pick.map(|m| m.choice), Some(DieChoice::First));
//! ```

pub mod strategy;

pub use strategy::{from_kind, CapturePreferring, FirstFit, OpponentStrategy};
