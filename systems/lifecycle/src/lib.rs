#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Song lifecycle state machine driven by key events and per-tick checks.

use std::time::Duration;

use keyfall_core::{Command, Event, GameState, Key};

/// Pure system that turns key events and tick outcomes into lifecycle commands.
#[derive(Debug, Default)]
pub struct Lifecycle;

impl Lifecycle {
    /// Creates a new lifecycle system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Interprets a single key-down event for the provided lifecycle state.
    ///
    /// At most one command is emitted per key, so a control key never doubles as
    /// a lane press. Lane keys only become inputs while playing and are stamped
    /// with `input_time`. Resuming from pause arms a countdown of length
    /// `countdown`; a zero-length countdown resumes immediately.
    pub fn handle_key(
        &mut self,
        key: Key,
        state: GameState,
        input_time: f64,
        countdown: Duration,
        out: &mut Vec<Command>,
    ) {
        let command = match (state, key) {
            (GameState::GameOver, _) => Command::Reset,
            (GameState::Start, Key::Arm) => Command::SetState {
                state: GameState::Playing,
            },
            (GameState::Playing, Key::Pause) => Command::SetState {
                state: GameState::Paused,
            },
            (GameState::Playing, Key::Lane(lane)) => Command::QueueInput {
                lane,
                time: input_time,
            },
            (GameState::Paused, Key::Pause) if countdown.is_zero() => Command::SetState {
                state: GameState::Playing,
            },
            (GameState::Paused, Key::Pause) => Command::StartCountdown {
                duration: countdown,
            },
            (GameState::Paused, Key::Confirm) => Command::SetState {
                state: GameState::SongSelect,
            },
            (GameState::Countdown, Key::Pause) => Command::SetState {
                state: GameState::Paused,
            },
            _ => return,
        };

        out.push(command);
    }

    /// Evaluates the per-tick transitions that need no key press.
    ///
    /// A playing attempt whose notes are all resolved ends in
    /// [`GameState::GameOver`]; an elapsed countdown resumes play.
    pub fn handle(
        &mut self,
        events: &[Event],
        state: GameState,
        all_notes_resolved: bool,
        out: &mut Vec<Command>,
    ) {
        match state {
            GameState::Playing if all_notes_resolved => out.push(Command::SetState {
                state: GameState::GameOver,
            }),
            GameState::Countdown
                if events
                    .iter()
                    .any(|event| matches!(event, Event::CountdownElapsed)) =>
            {
                out.push(Command::SetState {
                    state: GameState::Playing,
                });
            }
            _ => {}
        }
    }
}
