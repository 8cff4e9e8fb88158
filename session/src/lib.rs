#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scene driver that owns a rhythm world and feeds it clock ticks and key events.
//!
//! A [`Session`] runs one gameplay scene: every [`Session::update`] publishes
//! the transport clock, resolves pending inputs, sweeps misses and evaluates
//! lifecycle checks in that order, while [`Session::on_key_down`] routes
//! discrete key presses through auto-repeat suppression into the lifecycle
//! state machine. [`App`] switches between the song menu and gameplay.

use std::time::Duration;

use keyfall_core::{
    Command, ConfigError, Event, GameplayConfig, Key, Lane, NoteRecord, Transport, WorldSnapshot,
};
use keyfall_world::{self as world, query, RhythmWorld, WorldError};

mod app;
mod handler;
mod input;
mod step;
mod transport;

pub use app::App;
pub use input::InputLayer;
pub use step::{EngineConfig, FixedStep};
pub use transport::{ManualTransport, WallClockTransport};

use handler::{Context, Handler};

/// Gameplay scene for a single song attempt.
#[derive(Debug)]
pub struct Session<T: Transport> {
    world: RhythmWorld,
    transport: T,
    input: InputLayer,
    handlers: Vec<Handler>,
    events: Vec<Event>,
}

impl<T: Transport> Session<T> {
    /// Builds a world from the note source and wraps it in a session.
    pub fn new(
        records: &[NoteRecord],
        config: GameplayConfig,
        transport: T,
    ) -> Result<Self, WorldError> {
        let world = RhythmWorld::new(records, config)?;
        Ok(Self::with_world(world, transport))
    }

    /// Wraps an already constructed world.
    pub fn with_world(world: RhythmWorld, mut transport: T) -> Self {
        transport.pause();
        transport.rewind();
        log::info!(
            "session ready with {} notes",
            query::note_view(&world).len()
        );

        Self {
            world,
            transport,
            input: InputLayer::new(),
            handlers: Handler::gameplay(),
            events: Vec::new(),
        }
    }

    /// Runs one simulation tick of length `dt`.
    pub fn update(&mut self, dt: Duration) {
        self.events.clear();
        for handler in &mut self.handlers {
            let mut ctx = Context {
                world: &mut self.world,
                transport: &mut self.transport,
                events: &mut self.events,
            };
            handler.update(&mut ctx, dt);
        }
        self.observe(0);
    }

    /// Handles a key-down for the provided key code.
    ///
    /// Repeated key-downs for a held code are dropped.
    pub fn on_key_down(&mut self, code: &str) {
        if !self.input.press(code) {
            return;
        }

        let key = Key::from_code(code);
        let first = self.events.len();
        for handler in &mut self.handlers {
            let mut ctx = Context {
                world: &mut self.world,
                transport: &mut self.transport,
                events: &mut self.events,
            };
            handler.on_key_down(&mut ctx, key);
        }
        self.observe(first);
    }

    /// Handles a key-up for the provided key code.
    pub fn on_key_up(&mut self, code: &str) {
        let _ = self.input.release(code);
        let key = Key::from_code(code);
        for handler in &mut self.handlers {
            handler.on_key_up(key);
        }
    }

    /// Restores the attempt to its initial condition without reloading notes.
    pub fn reset(&mut self) {
        let _ = self.execute(Command::Reset);
    }

    /// Swaps in a new gameplay configuration, effective from the next tick.
    pub fn configure(&mut self, config: GameplayConfig) -> Result<(), ConfigError> {
        let first = self.execute(Command::ConfigureGameplay { config });
        self.events[first..]
            .iter()
            .find_map(|event| match event {
                Event::ConfigurationRejected { reason } => Some(*reason),
                _ => None,
            })
            .map_or(Ok(()), Err)
    }

    /// Restores the default gameplay configuration.
    pub fn reset_config(&mut self) {
        let _ = self.execute(Command::ConfigureGameplay {
            config: GameplayConfig::default(),
        });
    }

    /// Captures an owned snapshot of the world for rendering.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        query::snapshot(&self.world)
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &RhythmWorld {
        &self.world
    }

    /// Read-only access to the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport, used to drive manual clocks.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Reports whether the lane key is currently held.
    #[must_use]
    pub fn lane_pressed(&self, lane: Lane) -> bool {
        self.handlers
            .iter()
            .find_map(|handler| handler.lane_pressed(lane))
            .unwrap_or(false)
    }

    /// Events produced by the latest tick and any key events since.
    #[must_use]
    pub fn recent_events(&self) -> &[Event] {
        &self.events
    }

    /// Stops playback and tears down every handler.
    pub fn destroy(&mut self) {
        for handler in &mut self.handlers {
            handler.destroy(&mut self.transport);
        }
        self.handlers.clear();
        self.input.clear();
    }

    /// Tears the session down and hands the transport back.
    #[must_use]
    pub fn into_transport(mut self) -> T {
        self.destroy();
        self.transport.rewind();
        self.transport
    }

    fn execute(&mut self, command: Command) -> usize {
        let first = self.events.len();
        world::apply(&mut self.world, command, &mut self.events);
        self.observe(first);
        first
    }

    fn observe(&mut self, first: usize) {
        let Self {
            world,
            transport,
            handlers,
            events,
            ..
        } = self;
        for handler in handlers.iter_mut() {
            handler.observe(world, &mut *transport, &events[first..]);
        }
    }
}
