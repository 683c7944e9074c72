//! End-to-end tests for the room actor and registry.
//!
//! All timing runs under `start_paused`, so countdown tests advance the
//! Tokio clock instead of sleeping for real. Awaiting `handle.info()`
//! doubles as a barrier: the actor processes commands in order, so once
//! the info round-trip returns, everything sent before it has landed.

use std::time::Duration;

use partyroom_games::GameRegistry;
use partyroom_protocol::{
    ActionKind, EventEnvelope, GameMove, GameType, Phase, PlayerId, RejectReason, RoomCode,
    ServerEvent,
};
use partyroom_room::{MemoryStore, RegistryConfig, RoomError, RoomHandle, RoomRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;

type EventRx = mpsc::UnboundedReceiver<EventEnvelope>;

fn pid(s: &str) -> PlayerId {
    PlayerId::new(s)
}

fn registry() -> RoomRegistry<MemoryStore> {
    RoomRegistry::new(
        RegistryConfig::default(),
        Arc::new(GameRegistry::standard()),
        Arc::new(MemoryStore::new()),
    )
}

async fn create_room(registry: &mut RoomRegistry<MemoryStore>) -> (RoomCode, RoomHandle) {
    let code = registry.create_room().expect("code space free");
    let handle = registry.find(&code).expect("just created");
    (code, handle)
}

async fn join(handle: &RoomHandle, player: &str) -> EventRx {
    let (tx, rx) = mpsc::unbounded_channel();
    handle
        .join(pid(player), player.to_string(), tx)
        .await
        .expect("join accepted");
    rx
}

/// Waits (bounded) for the next event matching the predicate, skipping
/// everything else.
async fn next_matching(
    rx: &mut EventRx,
    pred: impl Fn(&ServerEvent) -> bool,
) -> EventEnvelope {
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            let envelope = rx.recv().await.expect("channel open");
            if pred(&envelope.event) {
                return envelope;
            }
        }
    })
    .await
    .expect("expected event never arrived")
}

/// Readies every non-host player, selects Nunchi, and starts the game.
async fn ready_select_start(handle: &RoomHandle, host: &str, others: &[&str]) {
    for player in others {
        handle
            .action(pid(player), ActionKind::SetReady { ready: true }, 0)
            .await
            .unwrap();
    }
    handle
        .action(
            pid(host),
            ActionKind::SelectGameType {
                game_type: GameType::Nunchi,
            },
            0,
        )
        .await
        .unwrap();
    handle.action(pid(host), ActionKind::StartGame, 0).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_join_broadcasts_roster_to_everyone() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;

    let mut host_rx = join(&handle, "host").await;
    let mut p2_rx = join(&handle, "p2").await;

    // The host saw both roster updates; the second carries two players
    // with the host flag still on the first joiner.
    let first = next_matching(&mut host_rx, |e| matches!(e, ServerEvent::RosterChanged { .. })).await;
    let ServerEvent::RosterChanged { players } = first.event else {
        unreachable!()
    };
    assert_eq!(players.len(), 1);
    assert!(players[0].is_host);

    let second =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::RosterChanged { .. })).await;
    let ServerEvent::RosterChanged { players } = second.event else {
        unreachable!()
    };
    assert_eq!(players.len(), 2);
    assert!(players[0].is_host);
    assert!(!players[1].is_host);

    // The joiner got the same two-player snapshot.
    let seen = next_matching(&mut p2_rx, |e| matches!(e, ServerEvent::RosterChanged { .. })).await;
    let ServerEvent::RosterChanged { players } = seen.event else {
        unreachable!()
    };
    assert_eq!(players.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_join_rejected() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;

    let _rx = join(&handle, "host").await;
    let (tx, _rx2) = mpsc::unbounded_channel();
    let result = handle.join(pid("host"), "host again", tx).await;

    assert_eq!(result, Err(RoomError::Rejected(RejectReason::AlreadyJoined)));
}

#[tokio::test(start_paused = true)]
async fn test_join_after_start_rejected() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;

    let _host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;
    ready_select_start(&handle, "host", &["p2"]).await;

    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, Phase::Countdown);

    let (tx, _rx) = mpsc::unbounded_channel();
    let result = handle.join(pid("late"), "late", tx).await;
    assert_eq!(
        result,
        Err(RoomError::Rejected(RejectReason::RoomNotJoinable))
    );
}

#[tokio::test(start_paused = true)]
async fn test_start_gated_on_game_type_ready_and_quorum() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;

    // Alone: no game type selected yet.
    handle.action(pid("host"), ActionKind::StartGame, 0).await.unwrap();
    let rejected =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::GameTypeNotSet }
    ));

    // Game type set, still alone: not enough players.
    handle
        .action(
            pid("host"),
            ActionKind::SelectGameType { game_type: GameType::Nunchi },
            0,
        )
        .await
        .unwrap();
    handle.action(pid("host"), ActionKind::StartGame, 0).await.unwrap();
    let rejected =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::NotEnoughPlayers }
    ));

    // Second player joined but is not ready.
    let _p2_rx = join(&handle, "p2").await;
    handle.action(pid("host"), ActionKind::StartGame, 0).await.unwrap();
    let rejected =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::NotAllReady }
    ));

    // Ready now: the start goes through.
    handle
        .action(pid("p2"), ActionKind::SetReady { ready: true }, 0)
        .await
        .unwrap();
    handle.action(pid("host"), ActionKind::StartGame, 0).await.unwrap();
    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, Phase::Countdown);
}

#[tokio::test(start_paused = true)]
async fn test_game_type_locked_once_countdown_begins() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;

    ready_select_start(&handle, "host", &["p2"]).await;

    // Mid-countdown the host can neither switch games...
    handle
        .action(
            pid("host"),
            ActionKind::SelectGameType { game_type: GameType::ThreeSixNine },
            0,
        )
        .await
        .unwrap();
    let rejected =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::GameTypeLocked }
    ));

    // ...nor start a second countdown.
    handle.action(pid("host"), ActionKind::StartGame, 0).await.unwrap();
    let rejected =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::WrongPhase }
    ));

    // The original selection and the running countdown are untouched.
    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, Phase::Countdown);
    assert_eq!(info.game_type, Some(GameType::Nunchi));
}

#[tokio::test(start_paused = true)]
async fn test_countdown_start_emits_one_event_for_the_edge() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;

    ready_select_start(&handle, "host", &["p2"]).await;
    // Barrier: everything above has been processed and broadcast.
    handle.info().await.unwrap();

    // The Lobby -> Countdown edge is announced by CountdownStarted
    // alone; no separate phase event precedes it.
    let mut countdown_events = 0;
    while let Ok(envelope) = host_rx.try_recv() {
        assert!(
            !matches!(envelope.event, ServerEvent::PhaseChanged { .. }),
            "unexpected phase event before Playing: {:?}",
            envelope.event
        );
        if matches!(envelope.event, ServerEvent::CountdownStarted { .. }) {
            countdown_events += 1;
        }
    }
    assert_eq!(countdown_events, 1);
}

#[tokio::test(start_paused = true)]
async fn test_non_host_cannot_select_or_start() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let _host_rx = join(&handle, "host").await;
    let mut p2_rx = join(&handle, "p2").await;

    handle
        .action(
            pid("p2"),
            ActionKind::SelectGameType { game_type: GameType::Nunchi },
            0,
        )
        .await
        .unwrap();
    let rejected =
        next_matching(&mut p2_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::NotHost }
    ));

    handle.action(pid("p2"), ActionKind::StartGame, 0).await.unwrap();
    let rejected =
        next_matching(&mut p2_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::NotHost }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_countdown_reaches_playing_without_client_input() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;

    ready_select_start(&handle, "host", &["p2"]).await;

    let countdown = next_matching(&mut host_rx, |e| {
        matches!(e, ServerEvent::CountdownStarted { .. })
    })
    .await;
    let ServerEvent::CountdownStarted { duration_ms, .. } = countdown.event else {
        unreachable!()
    };
    assert_eq!(duration_ms, 5_000);

    // No further commands: the server clock alone drives the transition.
    tokio::time::sleep(Duration::from_secs(6)).await;
    let playing = next_matching(&mut host_rx, |e| {
        matches!(e, ServerEvent::PhaseChanged { phase: Phase::Playing })
    })
    .await;
    assert!(playing.server_sequence > countdown.server_sequence);

    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, Phase::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_countdown_closes_room() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;

    ready_select_start(&handle, "host", &["p2"]).await;
    handle.disconnected(pid("p2")).await.unwrap();

    let closed =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::RoomClosed { .. })).await;
    assert!(matches!(closed.event, ServerEvent::RoomClosed { .. }));

    // The actor is gone; the handle goes dead.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(handle.info().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_move_before_playing_rejected_wrong_phase() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;

    handle
        .action(
            pid("host"),
            ActionKind::Move {
                game_move: GameMove::CallNext { ordinal: 1 },
            },
            0,
        )
        .await
        .unwrap();

    let rejected =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::WrongPhase }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_lapsed_lobby_seat_released_after_grace() {
    let mut config = RegistryConfig::default();
    config.room.reconnect_grace = Duration::from_secs(1);
    let mut registry = RoomRegistry::new(
        config,
        Arc::new(GameRegistry::standard()),
        Arc::new(MemoryStore::new()),
    );
    let (_, handle) = create_room(&mut registry).await;
    let _host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;

    handle.disconnected(pid("p2")).await.unwrap();
    assert_eq!(handle.info().await.unwrap().player_count, 2);

    // The grace lapses with no reconnect; the seat is dropped.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.info().await.unwrap().player_count, 1);

    // Too late to reattach...
    let (tx, _rx) = mpsc::unbounded_channel();
    let result = handle.reconnect(pid("p2"), tx).await;
    assert_eq!(
        result,
        Err(RoomError::Rejected(RejectReason::NotAParticipant))
    );

    // ...but the slot is open for a fresh join under the same id.
    let _again_rx = join(&handle, "p2").await;
    assert_eq!(handle.info().await.unwrap().player_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_in_game_seat_survives_grace_but_cannot_move() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let _host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;
    let _p3_rx = join(&handle, "p3").await;

    // p3 drops in the lobby; the game starts without them.
    handle.disconnected(pid("p3")).await.unwrap();
    ready_select_start(&handle, "host", &["p2"]).await;
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(handle.info().await.unwrap().phase, Phase::Playing);

    // Their seat survived the countdown and they may reattach, but the
    // running session never included them.
    let (tx, mut p3_rx) = mpsc::unbounded_channel();
    handle.reconnect(pid("p3"), tx).await.unwrap();
    handle
        .action(
            pid("p3"),
            ActionKind::Move { game_move: GameMove::CallNext { ordinal: 1 } },
            0,
        )
        .await
        .unwrap();

    let rejected =
        next_matching(&mut p3_rx, |e| matches!(e, ServerEvent::ActionRejected { .. })).await;
    assert!(matches!(
        rejected.event,
        ServerEvent::ActionRejected { reason: RejectReason::NotAParticipant }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_host_disconnect_promotes_next_joiner() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let _host_rx = join(&handle, "host").await;
    let mut p2_rx = join(&handle, "p2").await;

    handle.disconnected(pid("host")).await.unwrap();

    let roster = next_matching(&mut p2_rx, |e| {
        matches!(e, ServerEvent::RosterChanged { players }
            if players.iter().any(|p| p.id == pid("p2") && p.is_host))
    })
    .await;
    let ServerEvent::RosterChanged { players } = roster.event else {
        unreachable!()
    };
    let old_host = players.iter().find(|p| p.id == pid("host")).unwrap();
    assert!(!old_host.is_host);
    assert!(!old_host.connected);
}

#[tokio::test(start_paused = true)]
async fn test_event_sequences_strictly_increase_per_room() {
    let mut registry = registry();
    let (_, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;

    ready_select_start(&handle, "host", &["p2"]).await;
    tokio::time::sleep(Duration::from_secs(6)).await;
    // Barrier: everything above has been processed and broadcast.
    handle.info().await.unwrap();

    let mut last = 0;
    while let Ok(envelope) = host_rx.try_recv() {
        assert!(
            envelope.server_sequence > last,
            "sequence went {last} -> {}",
            envelope.server_sequence
        );
        last = envelope.server_sequence;
    }
    assert!(last > 0, "no events observed");
}

#[tokio::test(start_paused = true)]
async fn test_full_nunchi_game_finishes_and_sweeps() {
    let mut registry = registry();
    let (code, handle) = create_room(&mut registry).await;
    let mut host_rx = join(&handle, "host").await;
    let _p2_rx = join(&handle, "p2").await;
    let _p3_rx = join(&handle, "p3").await;

    ready_select_start(&handle, "host", &["p2", "p3"]).await;
    tokio::time::sleep(Duration::from_secs(6)).await;

    // p2 claims 1, host claims 2; p3 stayed silent and is eliminated.
    handle
        .action(
            pid("p2"),
            ActionKind::Move { game_move: GameMove::CallNext { ordinal: 1 } },
            0,
        )
        .await
        .unwrap();
    handle
        .action(
            pid("host"),
            ActionKind::Move { game_move: GameMove::CallNext { ordinal: 2 } },
            0,
        )
        .await
        .unwrap();

    let result =
        next_matching(&mut host_rx, |e| matches!(e, ServerEvent::RoundResult { .. })).await;
    let ServerEvent::RoundResult { outcome, eliminated } = result.event else {
        unreachable!()
    };
    assert_eq!(eliminated, vec![pid("p3")]);
    assert_eq!(
        outcome,
        partyroom_protocol::Outcome::Winner { player_id: pid("p2") }
    );

    next_matching(&mut host_rx, |e| {
        matches!(e, ServerEvent::PhaseChanged { phase: Phase::Finished })
    })
    .await;

    // The sweeper reaps the finished room.
    assert_eq!(registry.sweep().await, 1);
    assert!(registry.find(&code).is_none());
}
