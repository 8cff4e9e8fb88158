#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative rhythm world state for keyfall.
//!
//! The world is the single owned aggregate that every system reads and that
//! only [`apply`] mutates. Systems never hold references to one another; all
//! cross-component communication flows through the fields exposed by the
//! [`query`] module and the [`Command`]/[`Event`] streams.

use std::time::Duration;

use keyfall_core::{
    Command, ConfigError, Event, GameState, GameplayConfig, Lane, NoteRecord, PendingInput,
};
use log::{debug, warn};
use thiserror::Error;

mod ledger;
mod notes;

use ledger::Ledger;
use notes::NoteStore;

/// Represents the authoritative state of a single song attempt.
#[derive(Debug)]
pub struct RhythmWorld {
    state: GameState,
    song_time: f64,
    config: GameplayConfig,
    notes: NoteStore,
    ledger: Ledger,
    pending_inputs: Vec<PendingInput>,
    countdown: Option<Duration>,
}

impl RhythmWorld {
    /// Creates a world for one song attempt with every note active and counters zeroed.
    ///
    /// The note source must be non-empty and time-ordered within each lane; the
    /// configuration must pass [`GameplayConfig::validate`].
    pub fn new(records: &[NoteRecord], config: GameplayConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let notes = NoteStore::from_records(records)?;

        Ok(Self {
            state: GameState::Start,
            song_time: 0.0,
            config,
            notes,
            ledger: Ledger::default(),
            pending_inputs: Vec::new(),
            countdown: None,
        })
    }

    fn reset(&mut self) {
        self.notes.reset();
        self.ledger.reset();
        self.pending_inputs.clear();
        self.countdown = None;
        self.song_time = 0.0;
        self.state = GameState::Start;
    }

    fn transition(&mut self, to: GameState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }

        self.state = to;
        if to != GameState::Countdown {
            self.countdown = None;
        }
        debug!("state transition {from:?} -> {to:?} at {:.3}s", self.song_time);
        out_events.push(Event::StateChanged { from, to });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut RhythmWorld, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGameplay { config } => match config.validate() {
            Ok(()) => {
                world.config = config;
                out_events.push(Event::GameplayConfigured);
            }
            Err(reason) => {
                warn!("rejected gameplay configuration: {reason}");
                out_events.push(Event::ConfigurationRejected { reason });
            }
        },
        Command::AdvanceClock { song_time, dt } => {
            world.song_time = song_time;
            out_events.push(Event::ClockAdvanced { song_time, dt });

            if world.state == GameState::Countdown {
                if let Some(remaining) = world.countdown {
                    let next = remaining.saturating_sub(dt);
                    world.countdown = Some(next);
                    if !remaining.is_zero() && next.is_zero() {
                        out_events.push(Event::CountdownElapsed);
                    }
                }
            }
        }
        Command::QueueInput { lane, time } => {
            if world.state != GameState::Playing {
                return;
            }
            let input = PendingInput { lane, time };
            world.pending_inputs.push(input);
            out_events.push(Event::InputQueued { input });
        }
        Command::ClearPendingInputs => {
            world.pending_inputs.clear();
        }
        Command::JudgeNote {
            note,
            grade,
            input_time,
        } => {
            let Some(target) = world.notes.get_mut(note) else {
                return;
            };
            if !target.mark_hit(grade) {
                return;
            }

            let points = world.ledger.record_hit(grade, input_time, &world.config);
            debug!(
                "lane {} note {} hit {grade} (+{points}, combo {})",
                note.lane(),
                note.index(),
                world.ledger.combo()
            );
            out_events.push(Event::NoteHit {
                note,
                grade,
                points,
                combo: world.ledger.combo(),
            });
        }
        Command::MarkMissed { note } => {
            let Some(target) = world.notes.get_mut(note) else {
                return;
            };
            if !target.mark_missed() {
                return;
            }

            let broken_combo = world.ledger.record_miss();
            out_events.push(Event::NoteMissed { note, broken_combo });
        }
        Command::SetState { state } => {
            world.transition(state, out_events);
        }
        Command::StartCountdown { duration } => {
            world.transition(GameState::Countdown, out_events);
            world.countdown = Some(duration);
        }
        Command::Reset => {
            let from = world.state;
            world.reset();
            if from != GameState::Start {
                out_events.push(Event::StateChanged {
                    from,
                    to: GameState::Start,
                });
            }
            out_events.push(Event::WorldReset);
        }
    }
}

/// Errors that prevent a world from being constructed for an attempt.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WorldError {
    /// The note source contained no notes.
    #[error("note source is empty")]
    EmptyNoteSource,
    /// A note carried a negative or non-finite time.
    #[error("note {index} has an invalid time")]
    InvalidNoteTime {
        /// Position of the offending record in the note source.
        index: usize,
    },
    /// A lane's notes were not in non-decreasing time order.
    #[error("lane {lane} is out of order at note {index}")]
    UnsortedLane {
        /// Lane whose ordering was violated.
        lane: Lane,
        /// Position within the lane of the first out-of-order note.
        index: usize,
    },
    /// The gameplay configuration failed validation.
    #[error("invalid gameplay configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::RhythmWorld;
    use keyfall_core::{
        GameState, GameplayConfig, HitCounts, HitResult, LaneSnapshot, NoteSnapshot, NoteView,
        PendingInput, WorldSnapshot,
    };

    /// Current lifecycle state.
    #[must_use]
    pub fn state(world: &RhythmWorld) -> GameState {
        world.state
    }

    /// Song time in seconds as last published by the transport.
    #[must_use]
    pub fn song_time(world: &RhythmWorld) -> f64 {
        world.song_time
    }

    /// Gameplay configuration currently in force.
    #[must_use]
    pub fn config(world: &RhythmWorld) -> &GameplayConfig {
        &world.config
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &RhythmWorld) -> u64 {
        world.ledger.score()
    }

    /// Consecutive hits since the last miss.
    #[must_use]
    pub fn combo(world: &RhythmWorld) -> u32 {
        world.ledger.combo()
    }

    /// Highest combo reached during the attempt.
    #[must_use]
    pub fn max_combo(world: &RhythmWorld) -> u32 {
        world.ledger.max_combo()
    }

    /// Judgement tallies.
    #[must_use]
    pub fn hit_counts(world: &RhythmWorld) -> HitCounts {
        world.ledger.hit_counts()
    }

    /// Most recent successful hit.
    #[must_use]
    pub fn last_hit(world: &RhythmWorld) -> Option<HitResult> {
        world.ledger.last_hit()
    }

    /// Time left on the resume countdown.
    #[must_use]
    pub fn countdown_remaining(world: &RhythmWorld) -> Option<Duration> {
        world.countdown
    }

    /// Lane presses waiting for the next resolver pass, in arrival order.
    #[must_use]
    pub fn pending_inputs(world: &RhythmWorld) -> &[PendingInput] {
        &world.pending_inputs
    }

    /// Read-only view over the per-lane note sequences.
    #[must_use]
    pub fn note_view(world: &RhythmWorld) -> NoteView<'_> {
        world.notes.view()
    }

    /// Reports whether every note has been hit or missed.
    #[must_use]
    pub fn all_notes_resolved(world: &RhythmWorld) -> bool {
        world.notes.view().all_resolved()
    }

    /// Captures an owned snapshot for renderers and overlays.
    #[must_use]
    pub fn snapshot(world: &RhythmWorld) -> WorldSnapshot {
        let view = world.notes.view();
        let lanes = keyfall_core::Lane::ALL
            .into_iter()
            .map(|lane| LaneSnapshot {
                lane,
                notes: view
                    .lane(lane)
                    .iter()
                    .enumerate()
                    .map(|(index, note)| NoteSnapshot {
                        id: keyfall_core::NoteId::new(lane, index as u32),
                        time: note.time(),
                        duration: note.duration(),
                        status: note.status(),
                        grade: note.grade(),
                    })
                    .collect(),
            })
            .collect();

        WorldSnapshot {
            state: world.state,
            song_time: world.song_time,
            score: world.ledger.score(),
            combo: world.ledger.combo(),
            max_combo: world.ledger.max_combo(),
            hit_counts: world.ledger.hit_counts(),
            last_hit: world.ledger.last_hit(),
            countdown_remaining: world.countdown,
            lanes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyfall_core::{Grade, NoteId, NoteStatus};

    fn record(time: f64, lane: Lane) -> NoteRecord {
        NoteRecord {
            time,
            lane,
            duration: 0.2,
            velocity: 0.7,
            pitch: 64,
        }
    }

    fn playing_world(records: &[NoteRecord]) -> RhythmWorld {
        let mut world = RhythmWorld::new(records, GameplayConfig::default()).expect("valid world");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetState {
                state: GameState::Playing,
            },
            &mut events,
        );
        world
    }

    #[test]
    fn construction_rejects_empty_note_source() {
        let error = RhythmWorld::new(&[], GameplayConfig::default()).expect_err("empty source");
        assert_eq!(error, WorldError::EmptyNoteSource);
    }

    #[test]
    fn construction_rejects_unsorted_lane() {
        let records = [
            record(1.0, Lane::D),
            record(0.5, Lane::F),
            record(0.9, Lane::D),
        ];
        let error = RhythmWorld::new(&records, GameplayConfig::default()).expect_err("unsorted");
        assert_eq!(
            error,
            WorldError::UnsortedLane {
                lane: Lane::D,
                index: 1
            }
        );
    }

    #[test]
    fn construction_rejects_invalid_configuration() {
        let config = GameplayConfig {
            combo_step: 0,
            ..GameplayConfig::default()
        };
        let error = RhythmWorld::new(&[record(1.0, Lane::D)], config).expect_err("bad config");
        assert_eq!(error, WorldError::Config(ConfigError::ZeroComboStep));
    }

    #[test]
    fn construction_starts_with_active_notes_and_zeroed_counters() {
        let world = RhythmWorld::new(
            &[record(1.0, Lane::D), record(2.0, Lane::K)],
            GameplayConfig::default(),
        )
        .expect("valid world");

        let snapshot = query::snapshot(&world);
        assert_eq!(snapshot.state, GameState::Start);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.combo, 0);
        assert_eq!(snapshot.max_combo, 0);
        assert_eq!(snapshot.hit_counts.judged(), 0);
        assert_eq!(snapshot.total_notes(), 2);
        assert_eq!(snapshot.notes_remaining(), 2);
        assert!(snapshot.last_hit.is_none());
    }

    #[test]
    fn inputs_are_only_queued_while_playing() {
        let mut world =
            RhythmWorld::new(&[record(1.0, Lane::D)], GameplayConfig::default()).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::QueueInput {
                lane: Lane::D,
                time: 0.5,
            },
            &mut events,
        );
        assert!(query::pending_inputs(&world).is_empty());
        assert!(events.is_empty());

        apply(
            &mut world,
            Command::SetState {
                state: GameState::Playing,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::QueueInput {
                lane: Lane::D,
                time: 0.5,
            },
            &mut events,
        );
        assert_eq!(query::pending_inputs(&world).len(), 1);

        apply(&mut world, Command::ClearPendingInputs, &mut events);
        assert!(query::pending_inputs(&world).is_empty());
    }

    #[test]
    fn judging_credits_ledger_once_per_note() {
        let mut world = playing_world(&[record(1.0, Lane::D)]);
        let mut events = Vec::new();
        let note = NoteId::new(Lane::D, 0);

        for _ in 0..2 {
            apply(
                &mut world,
                Command::JudgeNote {
                    note,
                    grade: Grade::Perfect,
                    input_time: 1.01,
                },
                &mut events,
            );
        }

        assert_eq!(query::score(&world), 300);
        assert_eq!(query::combo(&world), 1);
        assert_eq!(query::hit_counts(&world).grade(Grade::Perfect), 1);
        assert_eq!(
            events,
            vec![Event::NoteHit {
                note,
                grade: Grade::Perfect,
                points: 300,
                combo: 1,
            }]
        );
    }

    #[test]
    fn missing_a_hit_note_is_ignored() {
        let mut world = playing_world(&[record(1.0, Lane::D)]);
        let mut events = Vec::new();
        let note = NoteId::new(Lane::D, 0);

        apply(
            &mut world,
            Command::JudgeNote {
                note,
                grade: Grade::Good,
                input_time: 1.14,
            },
            &mut events,
        );
        apply(&mut world, Command::MarkMissed { note }, &mut events);

        let view = query::note_view(&world);
        let stored = view.get(note).expect("note exists");
        assert_eq!(stored.status(), NoteStatus::Hit);
        assert_eq!(stored.grade(), Some(Grade::Good));
        assert_eq!(query::hit_counts(&world).missed(), 0);
        assert_eq!(query::combo(&world), 1);
    }

    #[test]
    fn unknown_notes_are_ignored() {
        let mut world = playing_world(&[record(1.0, Lane::D)]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MarkMissed {
                note: NoteId::new(Lane::J, 4),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::hit_counts(&world).missed(), 0);
    }

    #[test]
    fn miss_breaks_combo_but_keeps_max_combo() {
        let mut world = playing_world(&[
            record(1.0, Lane::D),
            record(1.5, Lane::D),
            record(2.0, Lane::D),
        ]);
        let mut events = Vec::new();

        for index in 0..2 {
            apply(
                &mut world,
                Command::JudgeNote {
                    note: NoteId::new(Lane::D, index),
                    grade: Grade::Great,
                    input_time: 1.0,
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::MarkMissed {
                note: NoteId::new(Lane::D, 2),
            },
            &mut events,
        );

        assert_eq!(query::combo(&world), 0);
        assert_eq!(query::max_combo(&world), 2);
        assert_eq!(
            events.last(),
            Some(&Event::NoteMissed {
                note: NoteId::new(Lane::D, 2),
                broken_combo: 2,
            })
        );
        assert!(query::all_notes_resolved(&world));
    }

    #[test]
    fn countdown_elapses_once_after_enough_ticks() {
        let mut world = playing_world(&[record(1.0, Lane::D)]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StartCountdown {
                duration: Duration::from_millis(100),
            },
            &mut events,
        );
        assert_eq!(query::state(&world), GameState::Countdown);

        for _ in 0..4 {
            apply(
                &mut world,
                Command::AdvanceClock {
                    song_time: 0.0,
                    dt: Duration::from_millis(40),
                },
                &mut events,
            );
        }

        let elapsed = events
            .iter()
            .filter(|event| matches!(event, Event::CountdownElapsed))
            .count();
        assert_eq!(elapsed, 1);
        assert_eq!(query::countdown_remaining(&world), Some(Duration::ZERO));

        apply(
            &mut world,
            Command::SetState {
                state: GameState::Playing,
            },
            &mut events,
        );
        assert_eq!(query::countdown_remaining(&world), None);
    }

    #[test]
    fn rejected_configuration_leaves_previous_values() {
        let mut world = playing_world(&[record(1.0, Lane::D)]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureGameplay {
                config: GameplayConfig {
                    good_window: 0.01,
                    ..GameplayConfig::default()
                },
            },
            &mut events,
        );

        assert_eq!(query::config(&world), &GameplayConfig::default());
        assert_eq!(
            events,
            vec![Event::ConfigurationRejected {
                reason: ConfigError::UnorderedWindows
            }]
        );
    }

    #[test]
    fn reset_restores_initial_condition_in_place() {
        let mut world = playing_world(&[record(1.0, Lane::D), record(2.0, Lane::F)]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::AdvanceClock {
                song_time: 2.5,
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::JudgeNote {
                note: NoteId::new(Lane::D, 0),
                grade: Grade::Perfect,
                input_time: 1.0,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MarkMissed {
                note: NoteId::new(Lane::F, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetState {
                state: GameState::GameOver,
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::Reset, &mut events);

        assert_eq!(
            events,
            vec![
                Event::StateChanged {
                    from: GameState::GameOver,
                    to: GameState::Start,
                },
                Event::WorldReset,
            ]
        );
        let snapshot = query::snapshot(&world);
        assert_eq!(snapshot.state, GameState::Start);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.max_combo, 0);
        assert_eq!(snapshot.hit_counts.judged(), 0);
        assert!(snapshot.song_time.abs() < f64::EPSILON);
        assert_eq!(snapshot.notes_remaining(), 2);
        assert!(snapshot
            .lanes
            .iter()
            .flat_map(|lane| lane.notes.iter())
            .all(|note| note.grade.is_none()));
    }
}
