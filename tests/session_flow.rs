//! End-to-end session scenarios driven through the public API

use mushroom_merge::Tuning;
use mushroom_merge::persistence::{MemoryStore, ScoreStore};
use mushroom_merge::sim::{GameEvent, GameSession, RapierWorld, SessionPhase, TickInput, tick};
use proptest::prelude::*;

/// Every held object is the smallest class
fn single_class_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.rules.spawn_pool = 1;
    tuning
}

fn started(tuning: Tuning, seed: u64) -> GameSession {
    let world = RapierWorld::new(&tuning.physics);
    let mut session = GameSession::new(tuning, world, seed);
    session.start_session();
    session
}

fn run_ticks(session: &mut GameSession, n: usize, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..n {
        tick(session, input);
        events.extend(session.drain_events());
    }
    events
}

const DROP: TickInput = TickInput {
    pointer_x: None,
    drop: true,
    autoplay: false,
};
const IDLE: TickInput = TickInput {
    pointer_x: None,
    drop: false,
    autoplay: false,
};

#[test]
fn two_stacked_drops_fuse_into_next_class() {
    let mut s = started(single_class_tuning(), 42);
    s.drain_events();

    // First drop at tick 1, replacement held at tick 61, second drop at 62
    run_ticks(&mut s, 1, &DROP);
    run_ticks(&mut s, 60, &IDLE);
    assert!(s.dropper().can_drop());
    let mut events = run_ticks(&mut s, 1, &DROP);
    events.extend(run_ticks(&mut s, 300, &IDLE));

    let fused: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Fused { from_class, to_class, position } => {
                Some((*from_class, *to_class, *position))
            }
            _ => None,
        })
        .collect();
    assert_eq!(fused.len(), 1, "events: {events:?}");
    let (from, to, position) = fused[0];
    assert_eq!((from, to), (0, 1));
    assert!((position.x - 180.0).abs() < 1e-3);

    assert_eq!(s.score(), 20);
    assert!(events.contains(&GameEvent::ScoreChanged(20)));

    let objects: Vec<_> = s.objects().collect();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].class_index, 1);
    // Came to rest on the floor, well below the danger line
    assert!(objects[0].pos.y > s.tuning().arena.danger_line_y);
    assert_eq!(s.phase(), SessionPhase::Active);
}

#[test]
fn restart_mid_game_starts_clean() {
    let mut s = started(single_class_tuning(), 7);
    s.spawn_object(2, glam::Vec2::new(100.0, 400.0));
    run_ticks(&mut s, 1, &DROP);
    assert_eq!(s.pending_tasks(), 1);

    s.start_session();
    assert_eq!(s.phase(), SessionPhase::Active);
    assert_eq!(s.score(), 0);
    assert_eq!(s.object_count(), 0);
    assert_eq!(s.time_ticks(), 0);
    s.drain_events();

    // The spawn scheduled by the old session never fires
    let events = run_ticks(&mut s, 120, &IDLE);
    let spawns = events
        .iter()
        .filter(|e| matches!(e, GameEvent::HeldSpawned { .. }))
        .count();
    assert_eq!(spawns, 0);
    assert!(s.dropper().held().is_some());
}

#[test]
fn repeated_drop_commands_create_one_body() {
    let mut s = started(Tuning::default(), 5);
    assert!(s.pointer_down());
    assert!(!s.pointer_down());
    run_ticks(&mut s, 30, &DROP);
    assert_eq!(s.object_count(), 1);
}

#[test]
fn pointer_is_clamped_between_walls() {
    let mut s = started(Tuning::default(), 5);
    s.pointer_move(-500.0);
    assert_eq!(s.dropper().held().map(|h| h.pos.x), Some(30.0));
    s.pointer_move(10_000.0);
    assert_eq!(s.dropper().held().map(|h| h.pos.x), Some(330.0));
}

#[test]
fn forfeit_reports_score_and_freezes_session() {
    let mut s = started(Tuning::default(), 11);
    s.drain_events();
    s.end_session_early();
    assert_eq!(s.drain_events(), vec![GameEvent::GameOver { final_score: 0 }]);

    assert!(!s.pointer_down());
    let events = run_ticks(&mut s, 10, &DROP);
    assert!(events.is_empty());
    assert_eq!(s.object_count(), 0);
}

#[test]
fn finished_session_lands_on_leaderboard() {
    let mut s = started(Tuning::default(), 3);
    let autoplay = TickInput {
        autoplay: true,
        ..Default::default()
    };
    run_ticks(&mut s, 600, &autoplay);
    s.end_session_early();
    assert!(s.is_over());

    let mut store = MemoryStore::new();
    let rank = store.record("", s.score(), 0.0).unwrap();
    assert_eq!(rank, Some(1));
    let board = store.load();
    assert_eq!(board.entries[0].name, "Anonymous");
    assert_eq!(board.top_score(), Some(s.score()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn spawned_classes_stay_in_pool(seed in any::<u64>()) {
        let mut s = started(Tuning::default(), seed);
        let autoplay = TickInput { autoplay: true, ..Default::default() };
        let mut events = s.drain_events();
        events.extend(run_ticks(&mut s, 900, &autoplay));

        for event in &events {
            match event {
                GameEvent::NextClassChanged(class) => prop_assert!(*class <= 2),
                GameEvent::HeldSpawned { class_index, .. } => prop_assert!(*class_index <= 2),
                GameEvent::Dropped { class_index, .. } => prop_assert!(*class_index <= 2),
                _ => {}
            }
        }
        prop_assert!(s.next_class() <= 2);
    }

    #[test]
    fn score_never_decreases(seed in any::<u64>()) {
        let mut s = started(Tuning::default(), seed);
        let autoplay = TickInput { autoplay: true, ..Default::default() };
        let mut last = 0;
        for _ in 0..900 {
            tick(&mut s, &autoplay);
            prop_assert!(s.score() >= last);
            last = s.score();
        }
    }
}
