//! Core engine types: seats, dice, actions, RNG, configuration.
//!
//! Everything the rest of the engine builds on and nothing game-flow
//! specific: the coordinator, executor and match loop live elsewhere.

pub mod seat;
pub mod rng;
pub mod config;
pub mod action;

pub use seat::{Seat, SeatMap, SEAT_COUNT};
pub use rng::{GameRng, GameRngState, RandomSource, ScriptedDice, DIE_FACES};
pub use config::{ConfigError, Controller, MatchConfig, SeatSetup, StrategyKind, Timing};
pub use action::{Action, ActionRecord, DieChoice, Roll};
