//! Match orchestration: the event loop, its virtual clock, host
//! notifications and the rendering snapshot.
//!
//! ## Overview
//!
//! - `session`: `Match`, the serialized input loop over local commands,
//!   peer envelopes and timers
//! - `scheduler`: virtual-clock timers stamped with the turn serial
//! - `host`: `MatchHost` win/loss callbacks
//! - `snapshot`: `MatchSnapshot`, a detached read-only view

pub mod host;
pub mod scheduler;
pub mod session;
pub mod snapshot;

pub use host::{MatchHost, NullHost, RecordingHost};
pub use scheduler::{Scheduler, Timer, TimerKind};
pub use session::{Command, Match};
pub use snapshot::MatchSnapshot;
