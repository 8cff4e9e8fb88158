use std::time::Duration;

use keyfall_core::{Command, Event, GameState, GameplayConfig, Grade, Key, Lane, NoteId, NoteRecord};
use keyfall_system_lifecycle::Lifecycle;
use keyfall_world::{self as world, query, RhythmWorld};

fn new_world() -> RhythmWorld {
    RhythmWorld::new(
        &[
            NoteRecord {
                time: 1.0,
                lane: Lane::D,
                duration: 0.1,
                velocity: 0.5,
                pitch: 60,
            },
            NoteRecord {
                time: 1.5,
                lane: Lane::K,
                duration: 0.1,
                velocity: 0.5,
                pitch: 72,
            },
        ],
        GameplayConfig::default(),
    )
    .expect("valid world")
}

fn key_down(world: &mut RhythmWorld, lifecycle: &mut Lifecycle, key: Key) -> Vec<Event> {
    let mut commands = Vec::new();
    lifecycle.handle_key(
        key,
        query::state(world),
        query::song_time(world),
        query::config(world).countdown(),
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn tick(world: &mut RhythmWorld, lifecycle: &mut Lifecycle, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::AdvanceClock {
            song_time: query::song_time(world),
            dt,
        },
        &mut events,
    );

    let mut commands = Vec::new();
    lifecycle.handle(
        &events,
        query::state(world),
        query::all_notes_resolved(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn resume_waits_for_the_countdown() {
    let mut world = new_world();
    let mut lifecycle = Lifecycle::new();

    let _ = key_down(&mut world, &mut lifecycle, Key::Arm);
    let _ = key_down(&mut world, &mut lifecycle, Key::Pause);
    assert_eq!(query::state(&world), GameState::Paused);

    let _ = key_down(&mut world, &mut lifecycle, Key::Pause);
    assert_eq!(query::state(&world), GameState::Countdown);
    assert_eq!(
        query::countdown_remaining(&world),
        Some(Duration::from_secs(3))
    );

    let _ = tick(&mut world, &mut lifecycle, Duration::from_secs(2));
    assert_eq!(query::state(&world), GameState::Countdown);

    let events = tick(&mut world, &mut lifecycle, Duration::from_secs(1));
    assert!(events.contains(&Event::StateChanged {
        from: GameState::Countdown,
        to: GameState::Playing,
    }));
    assert_eq!(query::countdown_remaining(&world), None);
}

#[test]
fn pause_during_countdown_cancels_resume() {
    let mut world = new_world();
    let mut lifecycle = Lifecycle::new();

    for key in [Key::Arm, Key::Pause, Key::Pause, Key::Pause] {
        let _ = key_down(&mut world, &mut lifecycle, key);
    }
    assert_eq!(query::state(&world), GameState::Paused);

    let _ = tick(&mut world, &mut lifecycle, Duration::from_secs(5));
    assert_eq!(
        query::state(&world),
        GameState::Paused,
        "a cancelled countdown must not resume play"
    );
}

#[test]
fn resolving_every_note_ends_the_attempt_on_the_next_tick() {
    let mut world = new_world();
    let mut lifecycle = Lifecycle::new();
    let _ = key_down(&mut world, &mut lifecycle, Key::Arm);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::JudgeNote {
            note: NoteId::new(Lane::D, 0),
            grade: Grade::Perfect,
            input_time: 1.0,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::MarkMissed {
            note: NoteId::new(Lane::K, 0),
        },
        &mut events,
    );
    assert_eq!(query::state(&world), GameState::Playing);

    let events = tick(&mut world, &mut lifecycle, Duration::from_millis(16));
    assert!(events.contains(&Event::StateChanged {
        from: GameState::Playing,
        to: GameState::GameOver,
    }));

    let events = key_down(&mut world, &mut lifecycle, Key::Unmapped);
    assert!(events.contains(&Event::WorldReset));
    assert_eq!(query::state(&world), GameState::Start);
    assert!(!query::all_notes_resolved(&world));
}
