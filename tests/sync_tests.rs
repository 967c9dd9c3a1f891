//! Two participants mirrored over an in-process bus.
//!
//! Each side runs its own `Match`; the handshake fixes seats, then every
//! resolved roll, move and rotation is mirrored to the other side.

use ludo_core::board::{self, PathIndex, Position};
use ludo_core::core::{Action, DieChoice, MatchConfig, Roll, ScriptedDice, Seat, Timing};
use ludo_core::game::{Command, Match, RecordingHost};
use ludo_core::pieces::{PieceId, PieceRegistry};
use ludo_core::rules::TurnPhase;
use ludo_core::sync::{
    Envelope, LocalBus, Matchmaker, ParticipantId, Peer, Role, SyncEvent,
};

struct Pair {
    host: Match<RecordingHost>,
    guest: Match<RecordingHost>,
}

fn pair(host_faces: &[u8], guest_faces: &[u8], registry: PieceRegistry) -> Pair {
    let bus = LocalBus::new();
    let mut peer_a = Peer::new(ParticipantId::new(1), Box::new(bus.subscribe()));
    let mut peer_b = Peer::new(ParticipantId::new(2), Box::new(bus.subscribe()));

    let mut mm_a = Matchmaker::new(Seat::Yellow, Seat::Red);
    let mut mm_b = Matchmaker::new(Seat::Yellow, Seat::Red);
    mm_a.enter(&mut peer_a).unwrap();
    mm_b.enter(&mut peer_b).unwrap();

    let mut assigned_a = None;
    let mut assigned_b = None;
    for _ in 0..4 {
        assigned_a = assigned_a.or(mm_a.tick(&mut peer_a, 0).unwrap());
        assigned_b = assigned_b.or(mm_b.tick(&mut peer_b, 0).unwrap());
    }
    let assigned_a = assigned_a.expect("host assignment");
    let assigned_b = assigned_b.expect("guest assignment");
    assert_eq!(assigned_a.role, Role::Host);
    assert_eq!(assigned_b.role, Role::Guest);

    let template = MatchConfig::new(Seat::Yellow, Seat::Red).with_timing(Timing::instant());
    let build = |config: MatchConfig, peer: Peer, faces: &[u8]| {
        Match::new(config, RecordingHost::default())
            .unwrap()
            .with_random_source(Box::new(ScriptedDice::new(faces.iter().copied(), 3)))
            .with_registry(registry.clone())
            .with_peer(peer)
    };

    Pair {
        host: build(assigned_a.configure(template.clone()), peer_a, host_faces),
        guest: build(assigned_b.configure(template), peer_b, guest_faces),
    }
}

#[test]
fn test_handshake_assigns_opposing_seats() {
    let game = pair(&[], &[], PieceRegistry::new());
    assert_eq!(game.host.config().local_seat(), Some(Seat::Yellow));
    assert_eq!(game.host.config().remote_seat(), Some(Seat::Red));
    assert_eq!(game.guest.config().local_seat(), Some(Seat::Red));
    assert_eq!(game.guest.config().remote_seat(), Some(Seat::Yellow));
    assert_eq!(game.guest.turns().seat(), Seat::Yellow);
    assert_eq!(game.guest.status(), "Waiting for YELLOW...");
}

#[test]
fn test_turns_mirror_both_ways() {
    let mut game = pair(&[6, 3], &[6, 6], PieceRegistry::new());
    let yellow = PieceId::new(Seat::Yellow, 0);
    let red = PieceId::new(Seat::Red, 0);

    // Host plays Yellow's turn.
    game.host.submit(Command::Roll { seat: Seat::Yellow }).unwrap();
    game.host.advance(0);
    game.host
        .submit(Command::Move { seat: Seat::Yellow, piece: yellow, choice: DieChoice::First })
        .unwrap();
    game.host.advance(0);
    game.host
        .submit(Command::Move { seat: Seat::Yellow, piece: yellow, choice: DieChoice::Second })
        .unwrap();
    game.host.advance(0);
    assert_eq!(game.host.turns().seat(), Seat::Red);

    game.guest.advance(0);
    assert_eq!(game.guest.registry(), game.host.registry());
    assert_eq!(game.guest.turns().seat(), Seat::Red);
    assert_eq!(game.guest.status(), "Your Turn!");

    // Guest plays Red's turn with a double six.
    game.guest.submit(Command::Roll { seat: Seat::Red }).unwrap();
    game.guest.advance(0);
    game.guest
        .submit(Command::Move { seat: Seat::Red, piece: red, choice: DieChoice::First })
        .unwrap();
    game.guest.advance(0);
    game.guest
        .submit(Command::Move { seat: Seat::Red, piece: red, choice: DieChoice::Second })
        .unwrap();
    game.guest.advance(0);
    assert_eq!(game.guest.turns().seat(), Seat::Red);
    assert_eq!(game.guest.status(), "Bonus Roll! Roll again.");

    game.host.advance(0);
    assert_eq!(game.host.registry(), game.guest.registry());
    assert_eq!(game.host.turns().seat(), Seat::Red);
    assert_eq!(game.host.turns().phase(), TurnPhase::AwaitingRoll);
    assert_eq!(game.host.status(), "Waiting for RED...");
    assert_eq!(
        game.host.registry().get(red).unwrap().path_index().unwrap().get(),
        6
    );
}

#[test]
fn test_remote_seat_cannot_be_driven_locally() {
    let mut game = pair(&[], &[], PieceRegistry::new());
    assert!(game.guest.submit(Command::Roll { seat: Seat::Yellow }).is_err());
    assert!(game.guest.submit(Command::Roll { seat: Seat::Red }).is_err());
}

#[test]
fn test_win_signals_loss_to_peer() {
    let mut registry = PieceRegistry::new();
    for slot in 0..3 {
        registry.set_position(PieceId::new(Seat::Yellow, slot), Position::Home);
    }
    let last = PieceId::new(Seat::Yellow, 3);
    registry.set_position(last, board::position_at(Seat::Yellow, PathIndex::new(56).unwrap()));

    let mut game = pair(&[1, 2], &[], registry);
    game.host.submit(Command::Roll { seat: Seat::Yellow }).unwrap();
    game.host.advance(0);
    game.host
        .submit(Command::Move { seat: Seat::Yellow, piece: last, choice: DieChoice::First })
        .unwrap();
    game.host.advance(0);
    game.guest.advance(0);

    assert_eq!(game.host.host().wins, vec![2]);
    assert_eq!(game.guest.host().losses, 1);
    assert_eq!(game.guest.result(), game.host.result());
    assert_eq!(game.guest.status(), "YELLOW wins!");
}

#[test]
fn test_remote_moves_are_trusted() {
    let mut registry = PieceRegistry::new();
    let a = PieceId::new(Seat::Yellow, 0);
    let b = PieceId::new(Seat::Yellow, 1);
    registry.set_position(a, board::position_at(Seat::Yellow, PathIndex::new(10).unwrap()));
    registry.set_position(b, board::position_at(Seat::Yellow, PathIndex::new(7).unwrap()));

    let mut game = pair(&[], &[], registry);
    let sender = ParticipantId::new(1);
    let roll = Roll::new(3, 1).unwrap();

    game.guest.receive(Envelope::new(sender, 100, SyncEvent::Roll { seat: Seat::Yellow, roll }));
    // Locally this would be rejected: b lands on a.
    game.guest.receive(Envelope::new(
        sender,
        101,
        SyncEvent::Move { seat: Seat::Yellow, piece: b, choice: DieChoice::First, steps: 3 },
    ));

    let positions = game.guest.registry();
    assert_eq!(positions.get(a).unwrap().position, positions.get(b).unwrap().position);
}

#[test]
fn test_foreign_events_ignored() {
    let mut game = pair(&[], &[], PieceRegistry::new());
    let before = game.guest.snapshot();

    // The peer cannot move pieces of the guest's own seat.
    game.guest.receive(Envelope::new(
        ParticipantId::new(1),
        50,
        SyncEvent::Move {
            seat: Seat::Red,
            piece: PieceId::new(Seat::Red, 0),
            choice: DieChoice::First,
            steps: 6,
        },
    ));
    assert_eq!(game.guest.snapshot(), before);
}

#[test]
fn test_host_pass_hands_turn_to_guest() {
    let mut game = pair(&[2, 3], &[], PieceRegistry::new());

    game.host.submit(Command::Roll { seat: Seat::Yellow }).unwrap();
    game.host.advance(0);
    assert_eq!(game.host.turns().seat(), Seat::Red);
    assert_eq!(game.host.status(), "Waiting for RED...");

    game.guest.advance(0);
    assert_eq!(game.guest.turns().seat(), Seat::Red);
    assert_eq!(game.guest.turns().phase(), TurnPhase::AwaitingRoll);
    assert_eq!(game.guest.status(), "Your Turn!");
    assert!(game.guest.history().iter().any(|r| r.action == Action::Pass));
    assert!(game.guest.submit(Command::Roll { seat: Seat::Red }).is_ok());
}

#[test]
fn test_mirrored_roll_without_move_completes_turn() {
    let mut game = pair(&[], &[], PieceRegistry::new());
    let sender = ParticipantId::new(1);
    let roll = Roll::new(2, 3).unwrap();

    game.guest.receive(Envelope::new(sender, 100, SyncEvent::Roll { seat: Seat::Yellow, roll }));
    assert_eq!(game.guest.turns().seat(), Seat::Yellow);
    assert_eq!(game.guest.turns().phase(), TurnPhase::TurnComplete { bonus: false });
    assert_eq!(game.guest.status(), "No moves this time.");

    game.guest.receive(Envelope::new(sender, 101, SyncEvent::TurnChange { to: Seat::Red }));
    assert_eq!(game.guest.turns().seat(), Seat::Red);
    assert!(game.guest.submit(Command::Roll { seat: Seat::Red }).is_ok());
}

#[test]
fn test_guest_pass_hands_turn_back_to_host() {
    let mut game = pair(&[2, 3], &[1, 2], PieceRegistry::new());

    game.host.submit(Command::Roll { seat: Seat::Yellow }).unwrap();
    game.host.advance(0);
    game.guest.advance(0);

    game.guest.submit(Command::Roll { seat: Seat::Red }).unwrap();
    game.guest.advance(0);
    assert_eq!(game.guest.turns().seat(), Seat::Yellow);
    assert_eq!(game.guest.status(), "Waiting for YELLOW...");

    game.host.advance(0);
    assert_eq!(game.host.turns().seat(), Seat::Yellow);
    assert_eq!(game.host.turns().phase(), TurnPhase::AwaitingRoll);
    assert_eq!(game.host.status(), "Your Turn!");
    assert_eq!(game.host.turns().turn().number, game.guest.turns().turn().number);
    assert!(game.host.submit(Command::Roll { seat: Seat::Yellow }).is_ok());
}
