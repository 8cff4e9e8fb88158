use std::time::Duration;

use keyfall_core::{Command, Event, GameState, Key, Lane, Transport, LANE_COUNT};
use keyfall_system_hit_resolution::HitResolution;
use keyfall_system_lifecycle::Lifecycle;
use keyfall_system_miss_sweep::MissSweep;
use keyfall_world::{self as world, query, RhythmWorld};

/// Mutable state shared with every handler during one dispatch.
pub(crate) struct Context<'a> {
    pub(crate) world: &'a mut RhythmWorld,
    pub(crate) transport: &'a mut dyn Transport,
    pub(crate) events: &'a mut Vec<Event>,
}

impl Context<'_> {
    fn apply(&mut self, commands: &mut Vec<Command>) {
        for command in commands.drain(..) {
            world::apply(self.world, command, self.events);
        }
    }
}

/// Gameplay handlers, dispatched in declaration order every tick.
#[derive(Debug)]
pub(crate) enum Handler {
    /// Publishes the transport clock and keeps playback in step with the lifecycle.
    Transport,
    /// Resolves pending inputs, then sweeps misses.
    Judge {
        resolver: HitResolution,
        sweeper: MissSweep,
        commands: Vec<Command>,
    },
    /// Lifecycle transitions from keys and per-tick checks.
    Controls {
        lifecycle: Lifecycle,
        commands: Vec<Command>,
    },
    /// Held state of each lane key for hit-zone highlighting.
    Lanes { pressed: [bool; LANE_COUNT] },
}

impl Handler {
    /// Handlers in tick order.
    pub(crate) fn gameplay() -> Vec<Handler> {
        vec![
            Handler::Transport,
            Handler::Judge {
                resolver: HitResolution::new(),
                sweeper: MissSweep::new(),
                commands: Vec::new(),
            },
            Handler::Controls {
                lifecycle: Lifecycle::new(),
                commands: Vec::new(),
            },
            Handler::Lanes {
                pressed: [false; LANE_COUNT],
            },
        ]
    }

    pub(crate) fn update(&mut self, ctx: &mut Context<'_>, dt: Duration) {
        match self {
            Handler::Transport => {
                let song_time = ctx.transport.now();
                world::apply(
                    ctx.world,
                    Command::AdvanceClock { song_time, dt },
                    ctx.events,
                );
            }
            Handler::Judge {
                resolver,
                sweeper,
                commands,
            } => {
                if query::state(ctx.world) != GameState::Playing {
                    return;
                }

                let windows = query::config(ctx.world).windows();
                resolver.handle(
                    query::pending_inputs(ctx.world),
                    query::note_view(ctx.world),
                    &windows,
                    commands,
                );
                ctx.apply(commands);

                sweeper.handle(
                    query::song_time(ctx.world),
                    query::note_view(ctx.world),
                    &windows,
                    commands,
                );
                ctx.apply(commands);
            }
            Handler::Controls {
                lifecycle,
                commands,
            } => {
                lifecycle.handle(
                    ctx.events,
                    query::state(ctx.world),
                    query::all_notes_resolved(ctx.world),
                    commands,
                );
                ctx.apply(commands);
            }
            Handler::Lanes { .. } => {}
        }
    }

    pub(crate) fn on_key_down(&mut self, ctx: &mut Context<'_>, key: Key) {
        match self {
            Handler::Controls {
                lifecycle,
                commands,
            } => {
                let countdown = query::config(ctx.world).countdown();
                lifecycle.handle_key(
                    key,
                    query::state(ctx.world),
                    ctx.transport.now(),
                    countdown,
                    commands,
                );
                ctx.apply(commands);
            }
            Handler::Lanes { pressed } => {
                if let Key::Lane(lane) = key {
                    pressed[lane.index()] = true;
                }
            }
            Handler::Transport | Handler::Judge { .. } => {}
        }
    }

    pub(crate) fn on_key_up(&mut self, key: Key) {
        if let (Handler::Lanes { pressed }, Key::Lane(lane)) = (self, key) {
            pressed[lane.index()] = false;
        }
    }

    /// Reacts to the events produced by a completed dispatch.
    pub(crate) fn observe(
        &mut self,
        world: &RhythmWorld,
        transport: &mut dyn Transport,
        events: &[Event],
    ) {
        for event in events {
            match (&mut *self, event) {
                (Handler::Transport, Event::StateChanged { from, to }) => {
                    sync_transport(transport, *from, *to);
                }
                (Handler::Controls { .. }, Event::StateChanged { to, .. }) => match to {
                    GameState::Playing => log::debug!(
                        "attempt running at {:.3}s",
                        query::song_time(world)
                    ),
                    GameState::GameOver => {
                        let counts = query::hit_counts(world);
                        log::info!(
                            "attempt finished: score {}, max combo {}, {} hits, {} misses",
                            query::score(world),
                            query::max_combo(world),
                            counts.hits(),
                            counts.missed()
                        );
                    }
                    _ => {}
                },
                (Handler::Lanes { pressed }, Event::WorldReset) => {
                    *pressed = [false; LANE_COUNT];
                }
                _ => {}
            }
        }
    }

    pub(crate) fn lane_pressed(&self, lane: Lane) -> Option<bool> {
        match self {
            Handler::Lanes { pressed } => Some(pressed[lane.index()]),
            _ => None,
        }
    }

    pub(crate) fn destroy(&mut self, transport: &mut dyn Transport) {
        match self {
            Handler::Transport => transport.pause(),
            Handler::Judge { commands, .. } | Handler::Controls { commands, .. } => {
                commands.clear();
            }
            Handler::Lanes { pressed } => *pressed = [false; LANE_COUNT],
        }
    }
}

fn sync_transport(transport: &mut dyn Transport, from: GameState, to: GameState) {
    match to {
        GameState::Playing => {
            if from == GameState::Start {
                transport.unlock();
            }
            transport.play();
        }
        GameState::Paused | GameState::Countdown | GameState::GameOver => transport.pause(),
        GameState::Start | GameState::SongSelect => {
            transport.pause();
            transport.rewind();
        }
    }
}
