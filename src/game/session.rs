//! The match event loop.
//!
//! Local commands, inbound peer envelopes and fired timers all enter through
//! one `dispatch` and are handled one at a time, so local and remote actions
//! take the same paths through the coordinator and the executor.
//!
//! ```
//! use ludo_core::core::{MatchConfig, ScriptedDice, Seat, Timing};
//! use ludo_core::game::{Command, Match, NullHost};
//! use ludo_core::pieces::PieceId;
//! use ludo_core::core::DieChoice;
//!
//! let config = MatchConfig::new(Seat::Yellow, Seat::Red).with_timing(Timing::instant());
//! let mut game = Match::new(config, NullHost)
//!     .unwrap()
//!     .with_random_source(Box::new(ScriptedDice::new([6, 3], 0)));
//!
//! game.submit(Command::Roll { seat: Seat::Yellow }).unwrap();
//! game.advance(0);
//! assert_eq!(game.snapshot().status, "Pick a die & tap a seed!");
//!
//! let piece = PieceId::new(Seat::Yellow, 0);
//! game.submit(Command::Move { seat: Seat::Yellow, piece, choice: DieChoice::First }).unwrap();
//! game.advance(0);
//! assert!(!game.registry().get(piece).unwrap().is_at_base());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::{self, OpponentStrategy};
use crate::board::Position;
use crate::core::{
    Action, ActionRecord, ConfigError, Controller, DieChoice, GameRng, MatchConfig, RandomSource,
    Roll, Seat, DIE_FACES,
};
use crate::pieces::{PieceId, PieceRegistry};
use crate::rules::{
    self, LegalMove, MatchResult, MoveError, Progress, TurnCoordinator, TurnPhase,
};
use crate::sync::{Envelope, Peer, SyncEvent};

use super::host::{MatchHost, NullHost};
use super::scheduler::{Scheduler, TimerKind};
use super::snapshot::MatchSnapshot;

const STATUS_START: &str = "Tap the center to roll!";
const STATUS_ROLLING: &str = "Rolling...";
const STATUS_PICK: &str = "Pick a die & tap a seed!";
const STATUS_BONUS: &str = "Bonus Roll! Roll again.";
const STATUS_YOUR_TURN: &str = "Your Turn!";
const STATUS_NO_MOVES: &str = "No moves this time.";
const STATUS_YOU_WIN: &str = "You win!";

/// Input from the local human seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Roll {
        seat: Seat,
    },
    Move {
        seat: Seat,
        piece: PieceId,
        choice: DieChoice,
    },
}

/// Everything the loop reacts to.
#[derive(Clone, Copy, Debug)]
enum Input {
    Command(Command),
    Remote(Envelope),
    Timer(TimerKind),
}

/// A running two-seat match.
pub struct Match<H: MatchHost = NullHost> {
    config: MatchConfig,
    registry: PieceRegistry,
    turns: TurnCoordinator,
    scheduler: Scheduler,
    rng: Box<dyn RandomSource>,
    strategy: Box<dyn OpponentStrategy>,
    host: H,
    peer: Option<Peer>,
    history: Vec<ActionRecord>,
    sequence: u32,
    status: String,
    tumble: Option<Roll>,
    notified: bool,
}

impl<H: MatchHost> Match<H> {
    /// Start a match. The first seat's turn begins immediately.
    pub fn new(config: MatchConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let [a, b] = config.seats;
        let turns = TurnCoordinator::new([a.seat, b.seat], config.first_seat);
        let rng = Box::new(GameRng::new(config.seed));
        let strategy = ai::from_kind(config.strategy);

        let mut game = Self {
            config,
            registry: PieceRegistry::new(),
            turns,
            scheduler: Scheduler::new(),
            rng,
            strategy,
            host,
            peer: None,
            history: Vec::new(),
            sequence: 0,
            status: String::new(),
            tumble: None,
            notified: false,
        };
        let first = game.config.first_seat;
        info!(seats = ?game.turns.seats(), %first, "match started");
        game.begin_turn(first, false);
        if game.config.controller(first) == Some(Controller::Local) {
            game.status = STATUS_START.to_string();
        }
        Ok(game)
    }

    /// Replace the random source (dice, AI tie-breaks, tumble jitter).
    #[must_use]
    pub fn with_random_source(mut self, source: Box<dyn RandomSource>) -> Self {
        self.rng = source;
        self
    }

    /// Replace the AI strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn OpponentStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Start from saved piece positions instead of all-at-Base.
    #[must_use]
    pub fn with_registry(mut self, registry: PieceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Mirror over a peer channel.
    #[must_use]
    pub fn with_peer(mut self, peer: Peer) -> Self {
        self.peer = Some(peer);
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn turns(&self) -> &TurnCoordinator {
        &self.turns
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Resolved actions, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Virtual time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    #[must_use]
    pub fn result(&self) -> Option<MatchResult> {
        self.turns.result()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.result().is_some()
    }

    /// Moves open to the acting seat right now.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<LegalMove> {
        let turn = self.turns.turn();
        match (self.turns.phase(), turn.roll) {
            (TurnPhase::AwaitingMoveSelection, Some(roll)) => {
                rules::legal_moves(&self.registry, turn.seat, roll, turn.used).to_vec()
            }
            _ => Vec::new(),
        }
    }

    /// Detached view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        let turn = self.turns.turn();
        MatchSnapshot {
            positions: self.registry.positions(),
            seats: self.turns.seats(),
            active_seat: turn.seat,
            phase: self.turns.phase(),
            roll: turn.roll,
            used: turn.used,
            tumble: self.tumble,
            status: self.status.clone(),
            result: self.turns.result(),
            turn: turn.number,
            now_ms: self.scheduler.now(),
        }
    }

    // === Inputs ===

    /// Submit a local command. Rejections leave the match unchanged apart
    /// from the status message.
    pub fn submit(&mut self, command: Command) -> Result<(), MoveError> {
        self.dispatch(Input::Command(command))
    }

    /// Apply one inbound peer envelope.
    pub fn receive(&mut self, envelope: Envelope) {
        // Remote input never produces a rejection.
        let _ = self.dispatch(Input::Remote(envelope));
    }

    /// Drain the peer channel. Returns the number of envelopes applied.
    pub fn pump_remote(&mut self) -> usize {
        let mut applied = 0;
        while let Some(envelope) = self.peer.as_mut().and_then(Peer::receive) {
            self.receive(envelope);
            applied += 1;
        }
        applied
    }

    /// Let `ms` of virtual time pass, firing every timer that falls due.
    pub fn advance(&mut self, ms: u64) {
        self.pump_remote();
        let target = self.scheduler.now().saturating_add(ms);
        while let Some(timer) = self.scheduler.pop_due(target) {
            if timer.serial != self.serial() {
                debug!(kind = ?timer.kind, serial = timer.serial, "dropping stale timer");
                continue;
            }
            let _ = self.dispatch(Input::Timer(timer.kind));
            self.pump_remote();
        }
        self.scheduler.advance_to(target);
    }

    /// Fire timers until none are pending or `limit_ms` has passed.
    pub fn run_until_idle(&mut self, limit_ms: u64) {
        let deadline = self.scheduler.now().saturating_add(limit_ms);
        self.pump_remote();
        while let Some(due) = self.scheduler.next_due() {
            if due > deadline {
                break;
            }
            self.advance(due.saturating_sub(self.scheduler.now()));
        }
    }

    fn dispatch(&mut self, input: Input) -> Result<(), MoveError> {
        debug!(?input, "dispatch");
        match input {
            Input::Command(command) => self.handle_command(command),
            Input::Remote(envelope) => {
                self.apply_remote(envelope);
                Ok(())
            }
            Input::Timer(kind) => {
                self.fire(kind);
                Ok(())
            }
        }
    }

    // === Local input ===

    fn handle_command(&mut self, command: Command) -> Result<(), MoveError> {
        let result = match command {
            Command::Roll { seat } => self.local_roll(seat),
            Command::Move {
                seat,
                piece,
                choice,
            } => self.check_local(seat).and_then(|()| self.start_move(seat, piece, choice)),
        };
        if let Err(err) = result {
            debug!(?command, %err, "rejected");
            self.status = err.to_string();
        }
        result
    }

    fn check_local(&self, seat: Seat) -> Result<(), MoveError> {
        if self.is_finished() {
            return Err(MoveError::MatchOver);
        }
        match self.config.controller(seat) {
            Some(Controller::Local) => Ok(()),
            _ => Err(MoveError::NotYourTurn {
                seat,
                active: self.turns.seat(),
            }),
        }
    }

    fn local_roll(&mut self, seat: Seat) -> Result<(), MoveError> {
        self.check_local(seat)?;
        self.turns.request_roll(seat)?;
        self.start_tumble();
        Ok(())
    }

    // === Timers ===

    fn serial(&self) -> u32 {
        self.turns.turn().number
    }

    fn schedule(&mut self, delay_ms: u64, kind: TimerKind) {
        let serial = self.serial();
        self.scheduler.schedule(delay_ms, serial, kind);
    }

    fn tumble_delay(&mut self) -> u64 {
        let min = self.config.timing.tumble_min_ms;
        let span = self.config.timing.tumble_max_ms.saturating_sub(min);
        if span == 0 {
            return min;
        }
        let bound = u32::try_from(span.saturating_add(1)).unwrap_or(u32::MAX);
        min + u64::from(self.rng.below(bound))
    }

    fn start_tumble(&mut self) {
        self.status = STATUS_ROLLING.to_string();
        let frames = self.config.timing.tumble_frames.max(1);
        let delay = self.tumble_delay();
        self.schedule(delay, TimerKind::Tumble { remaining: frames - 1 });
    }

    fn fire(&mut self, kind: TimerKind) {
        if self.is_finished() {
            return;
        }
        match kind {
            TimerKind::Tumble { remaining } => {
                if self.turns.phase() != TurnPhase::Rolling {
                    return;
                }
                if remaining > 0 {
                    // Display faces only; the real faces are drawn on the last frame.
                    let faces = DIE_FACES as u32;
                    let shown = Roll::new(
                        self.rng.below(faces) as u8 + 1,
                        self.rng.below(faces) as u8 + 1,
                    );
                    self.tumble = shown;
                    let delay = self.tumble_delay();
                    self.schedule(delay, TimerKind::Tumble { remaining: remaining - 1 });
                } else {
                    self.tumble = None;
                    let roll = Roll::from_source(self.rng.as_mut());
                    self.settle_roll(roll);
                }
            }
            TimerKind::Step {
                piece,
                choice,
                steps,
                from,
                remaining,
            } => self.step(piece, choice, steps, from, remaining),
            TimerKind::NoMove | TimerKind::Rotate => self.rotate(),
            TimerKind::AiThink => {
                let seat = self.turns.seat();
                if self.config.controller(seat) == Some(Controller::Ai)
                    && self.turns.request_roll(seat).is_ok()
                {
                    self.start_tumble();
                }
            }
            TimerKind::AiMove => self.ai_move(),
        }
    }

    // === Turn flow ===

    fn settle_roll(&mut self, roll: Roll) {
        let seat = self.turns.seat();
        let progress = match self.turns.settle_roll(roll, &self.registry) {
            Ok(progress) => progress,
            Err(err) => {
                warn!(%seat, %err, "roll settled out of phase");
                return;
            }
        };
        self.record(seat, Action::Roll(roll));
        self.publish(seat, SyncEvent::Roll { seat, roll });
        self.after_progress(seat, progress);
    }

    fn start_move(&mut self, seat: Seat, piece: PieceId, choice: DieChoice) -> Result<(), MoveError> {
        let steps = self.turns.select_move(seat, piece, choice, &self.registry)?;
        let moving = *self
            .registry
            .get(piece)
            .ok_or(MoveError::UnknownPiece(piece.raw()))?;
        let hops = rules::hop_count(&moving, steps);
        debug!(%seat, %piece, ?choice, steps, "move started");
        self.schedule(
            self.config.timing.step_ms,
            TimerKind::Step {
                piece,
                choice,
                steps,
                from: moving.position,
                remaining: hops,
            },
        );
        Ok(())
    }

    fn step(&mut self, piece: PieceId, choice: DieChoice, steps: u8, from: Position, remaining: u8) {
        if let Err(err) = rules::step_once(&mut self.registry, piece) {
            warn!(%piece, %err, "step failed, abandoning move");
            self.turns.abandon_move();
            return;
        }
        if remaining > 1 {
            self.schedule(
                self.config.timing.step_ms,
                TimerKind::Step {
                    piece,
                    choice,
                    steps,
                    from,
                    remaining: remaining - 1,
                },
            );
            return;
        }

        let seat = piece.seat();
        let outcome = rules::settle_move(&mut self.registry, piece, from);
        let progress = self.turns.complete_move(&outcome, &self.registry);
        self.record(
            seat,
            Action::Move {
                piece,
                choice,
                steps,
                captured: outcome.captured.clone(),
            },
        );
        self.publish(
            seat,
            SyncEvent::Move {
                seat,
                piece,
                choice,
                steps,
            },
        );
        self.after_progress(seat, progress);
    }

    fn after_progress(&mut self, seat: Seat, progress: Progress) {
        let controller = self.config.controller(seat);
        match progress {
            Progress::AwaitingMove => match controller {
                Some(Controller::Local) => self.status = STATUS_PICK.to_string(),
                Some(Controller::Ai) => self.schedule(self.config.timing.ai_move_ms, TimerKind::AiMove),
                _ => {}
            },
            Progress::TurnOver { moved, .. } => {
                // A bonus is announced once the renewed turn accepts a roll.
                if !moved {
                    self.record(seat, Action::Pass);
                    self.status = STATUS_NO_MOVES.to_string();
                }
                if controller == Some(Controller::Remote) {
                    // The peer announces its own rotation.
                    return;
                }
                let (delay, kind) = if moved {
                    (self.config.timing.rotate_ms, TimerKind::Rotate)
                } else {
                    (self.config.timing.no_move_ms, TimerKind::NoMove)
                };
                self.schedule(delay, kind);
            }
            Progress::MatchOver(result) => self.finish(result),
        }
    }

    fn ai_move(&mut self) {
        let seat = self.turns.seat();
        if self.config.controller(seat) != Some(Controller::Ai) {
            return;
        }
        let turn = *self.turns.turn();
        let Some(roll) = turn.roll else {
            return;
        };
        let choice = self
            .strategy
            .choose(&self.registry, seat, roll, turn.used, self.rng.as_mut());
        match choice {
            Some(mv) => match self.start_move(seat, mv.piece, mv.choice) {
                Ok(()) => return,
                Err(err) => warn!(%seat, strategy = self.strategy.name(), %err, "AI picked an illegal move"),
            },
            None => warn!(%seat, strategy = self.strategy.name(), "AI found no move"),
        }
        // Forfeit the remaining dice so the match keeps going.
        if let Some(progress) = self.turns.forfeit(&self.registry) {
            self.after_progress(seat, progress);
        }
    }

    fn rotate(&mut self) {
        let from = self.turns.seat();
        let Some(next) = self.turns.advance() else {
            return;
        };
        self.sequence = 0;
        self.record(from, Action::TurnChange { to: next });
        // The seat handing the turn over announces it.
        self.publish(from, SyncEvent::TurnChange { to: next });
        self.begin_turn(next, next == from);
    }

    fn begin_turn(&mut self, seat: Seat, bonus: bool) {
        info!(%seat, turn = self.serial(), bonus, "turn");
        match self.config.controller(seat) {
            Some(Controller::Local) => {
                self.status = if bonus { STATUS_BONUS } else { STATUS_YOUR_TURN }.to_string();
            }
            Some(Controller::Ai) => {
                self.status = format!("{} thinking...", seat.label());
                self.schedule(self.config.timing.ai_think_ms, TimerKind::AiThink);
            }
            Some(Controller::Remote) => {
                self.status = format!("Waiting for {}...", seat.label());
            }
            None => warn!(%seat, "turn given to an inactive seat"),
        }
    }

    fn finish(&mut self, result: MatchResult) {
        self.scheduler.clear();
        let local = self.config.local_seat();
        self.status = match local {
            Some(seat) if result.is_winner(seat) => STATUS_YOU_WIN.to_string(),
            _ => format!("{} wins!", result.winner.label()),
        };
        info!(winner = %result.winner, loser = %result.loser, "match over");
        if self.notified {
            return;
        }
        self.notified = true;
        match local {
            Some(seat) if result.is_winner(seat) => self.host.on_win(self.config.payout_multiplier),
            Some(_) => self.host.on_lose(),
            None => {}
        }
    }

    // === Mirroring ===

    fn record(&mut self, seat: Seat, action: Action) {
        let turn = self.serial();
        self.history
            .push(ActionRecord::new(seat, action, turn, self.sequence));
        self.sequence += 1;
    }

    /// Mirror an event resolved for `origin`. Events of the remote seat
    /// came from the peer and are not echoed back.
    fn publish(&mut self, origin: Seat, event: SyncEvent) {
        if self.config.controller(origin) == Some(Controller::Remote) {
            return;
        }
        if let Some(peer) = self.peer.as_mut() {
            if let Err(err) = peer.send(event) {
                warn!(%err, ?event, "failed to mirror event");
            }
        }
    }

    fn apply_remote(&mut self, envelope: Envelope) {
        if envelope.event.is_handshake() {
            debug!(sender = %envelope.sender, "ignoring handshake during match");
            return;
        }
        if self.is_finished() {
            debug!(sender = %envelope.sender, "match over, ignoring peer event");
            return;
        }
        let remote = self.config.remote_seat();
        match envelope.event {
            SyncEvent::Roll { seat, roll } => {
                if remote != Some(seat) {
                    warn!(%seat, "peer rolled for a seat it does not control");
                    return;
                }
                let before = self.serial();
                let Some(progress) = self.turns.force_roll(seat, roll, &self.registry) else {
                    return;
                };
                if self.serial() != before {
                    self.sequence = 0;
                }
                self.tumble = None;
                self.record(seat, Action::Roll(roll));
                self.status = format!("{} rolled {}", seat.label(), roll);
                self.after_progress(seat, progress);
            }
            SyncEvent::Move {
                seat,
                piece,
                choice,
                steps,
            } => {
                if remote != Some(seat) || piece.seat() != seat {
                    warn!(%seat, %piece, "peer moved a piece it does not control");
                    return;
                }
                match rules::apply_unchecked(&mut self.registry, piece, steps) {
                    Ok(outcome) => {
                        let progress = self.turns.force_move(choice, &outcome, &self.registry);
                        self.record(
                            seat,
                            Action::Move {
                                piece,
                                choice,
                                steps,
                                captured: outcome.captured.clone(),
                            },
                        );
                        self.after_progress(seat, progress);
                    }
                    Err(err) => warn!(%piece, steps, %err, "peer move cannot be applied"),
                }
            }
            SyncEvent::TurnChange { to } => {
                if !self.config.is_active(to) {
                    warn!(seat = %to, "peer handed the turn to an inactive seat");
                    return;
                }
                let from = self.turns.seat();
                if self.turns.force_turn(to) {
                    self.sequence = 0;
                    self.record(from, Action::TurnChange { to });
                    self.begin_turn(to, from == to);
                }
            }
            SyncEvent::Announce { .. } | SyncEvent::Claim { .. } | SyncEvent::Ack { .. } => {}
        }
    }
}

impl<H: MatchHost + std::fmt::Debug> std::fmt::Debug for Match<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("config", &self.config)
            .field("turns", &self.turns)
            .field("status", &self.status)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
