//! Song clocks implementing the [`Transport`] contract.

use std::time::Instant;

use keyfall_core::Transport;

/// Deterministic transport whose clock only moves when advanced explicitly.
///
/// Used by headless simulation and tests. Advancing while paused is ignored,
/// mirroring an audio device that stops producing samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManualTransport {
    position: f64,
    playing: bool,
    unlocked: bool,
}

impl ManualTransport {
    /// Creates a stopped transport at the start of the song.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the playhead forward by `seconds` if playback is running.
    pub fn advance(&mut self, seconds: f64) {
        if self.playing && seconds.is_finite() && seconds > 0.0 {
            self.position += seconds;
        }
    }

    /// Reports whether playback is running.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Reports whether the output device was unlocked.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

impl Transport for ManualTransport {
    fn now(&self) -> f64 {
        self.position
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn unlock(&mut self) {
        self.unlocked = true;
    }

    fn rewind(&mut self) {
        self.position = 0.0;
    }
}

/// Transport driven by the monotonic system clock.
#[derive(Clone, Debug, Default)]
pub struct WallClockTransport {
    offset: f64,
    started: Option<Instant>,
    unlocked: bool,
}

impl WallClockTransport {
    /// Creates a stopped transport at the start of the song.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn running_for(&self) -> f64 {
        self.started
            .map_or(0.0, |started| started.elapsed().as_secs_f64())
    }
}

impl Transport for WallClockTransport {
    fn now(&self) -> f64 {
        self.offset + self.running_for()
    }

    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.offset += self.running_for();
        self.started = None;
    }

    fn unlock(&mut self) {
        if !self.unlocked {
            log::info!("audio transport unlocked");
        }
        self.unlocked = true;
    }

    fn rewind(&mut self) {
        self.offset = 0.0;
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }
}
