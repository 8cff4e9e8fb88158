#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the keyfall engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative rhythm world, and pure systems. Adapters translate key codes
//! into [`Key`] values, systems inspect read-only [`NoteView`] and
//! [`WorldSnapshot`] values and respond with [`Command`] batches, and the world
//! executes those commands via its `apply` entry point before broadcasting
//! [`Event`] values describing what changed.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

mod config;

pub use config::{ConfigError, GameplayConfig, HitWindows, ThinningConfig};

/// Number of parallel lanes on the playfield.
pub const LANE_COUNT: usize = 4;

/// One of the parallel note tracks, each bound to a single input key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lane {
    /// Leftmost lane, bound to `KeyD`.
    D,
    /// Second lane, bound to `KeyF`.
    F,
    /// Third lane, bound to `KeyJ`.
    J,
    /// Rightmost lane, bound to `KeyK`.
    K,
}

impl Lane {
    /// Every lane ordered from left to right.
    pub const ALL: [Lane; LANE_COUNT] = [Lane::D, Lane::F, Lane::J, Lane::K];

    /// Zero-based position of the lane from the left edge of the playfield.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::D => 0,
            Self::F => 1,
            Self::J => 2,
            Self::K => 3,
        }
    }

    /// Resolves a lane from its zero-based position.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::D),
            1 => Some(Self::F),
            2 => Some(Self::J),
            3 => Some(Self::K),
            _ => None,
        }
    }

    /// Key code of the physical key bound to the lane.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::D => "KeyD",
            Self::F => "KeyF",
            Self::J => "KeyJ",
            Self::K => "KeyK",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::D => "D",
            Self::F => "F",
            Self::J => "J",
            Self::K => "K",
        };
        f.write_str(label)
    }
}

/// Logical interpretation of a physical key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Key bound to a lane.
    Lane(Lane),
    /// Arms the attempt from the start screen (`Space`).
    Arm,
    /// Toggles pause and cancels resume countdowns (`Escape`).
    Pause,
    /// Confirms menu choices and leaves a paused attempt (`Enter`).
    Confirm,
    /// Moves the song-select highlight upwards (`ArrowUp`).
    MenuUp,
    /// Moves the song-select highlight downwards (`ArrowDown`).
    MenuDown,
    /// Any code the engine does not interpret.
    Unmapped,
}

impl Key {
    /// Maps a key code (as reported by the input source) onto its logical meaning.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "KeyD" => Self::Lane(Lane::D),
            "KeyF" => Self::Lane(Lane::F),
            "KeyJ" => Self::Lane(Lane::J),
            "KeyK" => Self::Lane(Lane::K),
            "Space" => Self::Arm,
            "Escape" | "Esc" => Self::Pause,
            "Enter" => Self::Confirm,
            "ArrowUp" => Self::MenuUp,
            "ArrowDown" => Self::MenuDown,
            _ => Self::Unmapped,
        }
    }
}

/// Grade awarded to a successful hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Tightest window.
    Perfect,
    /// Middle window.
    Great,
    /// Loosest window.
    Good,
}

impl Grade {
    /// Grades ordered from the tightest window to the loosest.
    pub const ALL: [Grade; 3] = [Grade::Perfect, Grade::Great, Grade::Good];

    /// Human readable label used by overlays and summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Great => "Great",
            Self::Good => "Good",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a single note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteStatus {
    /// The note can still be hit.
    Active,
    /// The note was matched by an input.
    Hit,
    /// The note aged past the loosest hit window.
    Missed,
}

/// Timed note record supplied by the note source before the engine owns it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Absolute target time in seconds from the start of the song.
    pub time: f64,
    /// Lane the note scrolls down.
    pub lane: Lane,
    /// Sounding duration of the source note in seconds.
    pub duration: f64,
    /// Normalised loudness in the range 0.0..=1.0.
    pub velocity: f32,
    /// Pitch identifier of the source note.
    pub pitch: u8,
}

/// Stable identifier of a note: its lane and position within that lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId {
    lane: Lane,
    index: u32,
}

impl NoteId {
    /// Creates a note identifier from a lane and the note's position in it.
    #[must_use]
    pub const fn new(lane: Lane, index: u32) -> Self {
        Self { lane, index }
    }

    /// Lane that stores the note.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Zero-based position of the note within its lane.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }
}

/// A note owned by the rhythm world.
///
/// The status only ever moves from [`NoteStatus::Active`] to either
/// [`NoteStatus::Hit`] or [`NoteStatus::Missed`]; [`Note::reset`] is the only
/// way back. The grade is present exactly when the note was hit.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    time: f64,
    lane: Lane,
    duration: f64,
    velocity: f32,
    pitch: u8,
    status: NoteStatus,
    grade: Option<Grade>,
}

impl Note {
    /// Creates an active note from a source record.
    #[must_use]
    pub fn from_record(record: &NoteRecord) -> Self {
        Self {
            time: record.time,
            lane: record.lane,
            duration: record.duration,
            velocity: record.velocity,
            pitch: record.pitch,
            status: NoteStatus::Active,
            grade: None,
        }
    }

    /// Absolute target time in seconds.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Lane the note belongs to.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Duration of the source note in seconds.
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Normalised loudness of the source note.
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Pitch identifier of the source note.
    #[must_use]
    pub const fn pitch(&self) -> u8 {
        self.pitch
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> NoteStatus {
        self.status
    }

    /// Grade awarded when the note was hit.
    #[must_use]
    pub const fn grade(&self) -> Option<Grade> {
        self.grade
    }

    /// Reports whether the note can still be judged.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == NoteStatus::Active
    }

    /// Marks an active note as hit with the provided grade.
    ///
    /// Returns `false` without changes when the note was already resolved.
    pub fn mark_hit(&mut self, grade: Grade) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = NoteStatus::Hit;
        self.grade = Some(grade);
        true
    }

    /// Marks an active note as missed.
    ///
    /// Returns `false` without changes when the note was already resolved.
    pub fn mark_missed(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = NoteStatus::Missed;
        true
    }

    /// Restores the note to its freshly loaded state.
    pub fn reset(&mut self) {
        self.status = NoteStatus::Active;
        self.grade = None;
    }
}

/// Read-only view over the per-lane note sequences.
#[derive(Clone, Copy, Debug)]
pub struct NoteView<'a> {
    lanes: [&'a [Note]; LANE_COUNT],
}

impl<'a> NoteView<'a> {
    /// Captures a view backed by the provided lane slices, ordered as [`Lane::ALL`].
    #[must_use]
    pub const fn new(lanes: [&'a [Note]; LANE_COUNT]) -> Self {
        Self { lanes }
    }

    /// Time-ordered notes stored in the provided lane.
    #[must_use]
    pub fn lane(&self, lane: Lane) -> &'a [Note] {
        self.lanes[lane.index()]
    }

    /// Looks up a note by identifier.
    #[must_use]
    pub fn get(&self, id: NoteId) -> Option<&'a Note> {
        let index = usize::try_from(id.index()).ok()?;
        self.lane(id.lane()).get(index)
    }

    /// Iterates over every note lane by lane, yielding identifiers alongside notes.
    pub fn iter(&self) -> impl Iterator<Item = (NoteId, &'a Note)> + 'a {
        let lanes = self.lanes;
        Lane::ALL.into_iter().flat_map(move |lane| {
            lanes[lane.index()]
                .iter()
                .enumerate()
                .map(move |(index, note)| (NoteId::new(lane, index as u32), note))
        })
    }

    /// Total number of notes across all lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.iter().map(|lane| lane.len()).sum()
    }

    /// Reports whether the view contains no notes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports whether every note has been hit or missed.
    #[must_use]
    pub fn all_resolved(&self) -> bool {
        self.lanes
            .iter()
            .all(|lane| lane.iter().all(|note| !note.is_active()))
    }
}

/// Timestamped intent to hit a lane, recorded once per accepted keypress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingInput {
    /// Lane the player pressed.
    pub lane: Lane,
    /// Song time in seconds at which the key went down.
    pub time: f64,
}

/// Most recent successful hit, kept for transient on-screen feedback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitResult {
    /// Grade awarded to the hit.
    pub grade: Grade,
    /// Input time in seconds that produced the hit.
    pub time: f64,
}

/// Tally of judgements accumulated during an attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HitCounts {
    perfect: u32,
    great: u32,
    good: u32,
    missed: u32,
}

impl HitCounts {
    /// Increments the bucket matching the provided grade.
    pub fn record(&mut self, grade: Grade) {
        let bucket = match grade {
            Grade::Perfect => &mut self.perfect,
            Grade::Great => &mut self.great,
            Grade::Good => &mut self.good,
        };
        *bucket = bucket.saturating_add(1);
    }

    /// Increments the missed bucket.
    pub fn record_miss(&mut self) {
        self.missed = self.missed.saturating_add(1);
    }

    /// Number of hits awarded the provided grade.
    #[must_use]
    pub const fn grade(&self, grade: Grade) -> u32 {
        match grade {
            Grade::Perfect => self.perfect,
            Grade::Great => self.great,
            Grade::Good => self.good,
        }
    }

    /// Number of notes that were missed.
    #[must_use]
    pub const fn missed(&self) -> u32 {
        self.missed
    }

    /// Number of successful hits of any grade.
    #[must_use]
    pub const fn hits(&self) -> u32 {
        self.perfect
            .saturating_add(self.great)
            .saturating_add(self.good)
    }

    /// Number of notes judged so far, hits and misses alike.
    #[must_use]
    pub const fn judged(&self) -> u32 {
        self.hits().saturating_add(self.missed)
    }
}

/// Lifecycle state shared by gameplay and the song-select menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Waiting for the player to arm the attempt.
    Start,
    /// Notes scroll and inputs are judged.
    Playing,
    /// Gameplay is frozen.
    Paused,
    /// Resume buffer counting down before play continues.
    Countdown,
    /// Every note has been resolved.
    GameOver,
    /// The pre-attempt song menu is active.
    SongSelect,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the gameplay configuration after validating it.
    ConfigureGameplay {
        /// Configuration the world should adopt.
        config: GameplayConfig,
    },
    /// Publishes the authoritative song time and the elapsed tick duration.
    AdvanceClock {
        /// Song time reported by the transport, in seconds.
        song_time: f64,
        /// Wall time elapsed since the previous tick.
        dt: Duration,
    },
    /// Appends a timestamped lane press to the pending-input queue.
    QueueInput {
        /// Lane that was pressed.
        lane: Lane,
        /// Song time of the press in seconds.
        time: f64,
    },
    /// Removes every pending input after a resolver pass.
    ClearPendingInputs,
    /// Grades an active note as hit and credits the score ledger.
    JudgeNote {
        /// Note matched by the input.
        note: NoteId,
        /// Grade awarded to the hit.
        grade: Grade,
        /// Time of the input that matched the note.
        input_time: f64,
    },
    /// Marks an active note as missed and breaks the combo.
    MarkMissed {
        /// Note that aged past the loosest window.
        note: NoteId,
    },
    /// Transitions the world into the provided lifecycle state.
    SetState {
        /// State the world should enter.
        state: GameState,
    },
    /// Enters the countdown state with a freshly armed resume timer.
    StartCountdown {
        /// Time remaining before play resumes.
        duration: Duration,
    },
    /// Restores the world to its freshly constructed condition.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the gameplay configuration changed.
    GameplayConfigured,
    /// Reports that a configuration change was rejected.
    ConfigurationRejected {
        /// Validation failure that caused the rejection.
        reason: ConfigError,
    },
    /// Indicates that the song clock advanced.
    ClockAdvanced {
        /// Song time after the tick, in seconds.
        song_time: f64,
        /// Wall time elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a lane press entered the pending-input queue.
    InputQueued {
        /// Queued input.
        input: PendingInput,
    },
    /// Confirms that a note was hit.
    NoteHit {
        /// Note that was hit.
        note: NoteId,
        /// Grade awarded to the hit.
        grade: Grade,
        /// Points credited for the hit, combo multiplier included.
        points: u64,
        /// Combo after the hit.
        combo: u32,
    },
    /// Confirms that a note was missed.
    NoteMissed {
        /// Note that was missed.
        note: NoteId,
        /// Combo that the miss broke.
        broken_combo: u32,
    },
    /// Announces a lifecycle transition.
    StateChanged {
        /// State before the transition.
        from: GameState,
        /// State after the transition.
        to: GameState,
    },
    /// Reports that the resume countdown reached zero.
    CountdownElapsed,
    /// Confirms that the world returned to its initial condition.
    WorldReset,
}

/// Immutable representation of a single note used by renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteSnapshot {
    /// Identifier of the note.
    pub id: NoteId,
    /// Absolute target time in seconds.
    pub time: f64,
    /// Duration of the source note in seconds.
    pub duration: f64,
    /// Lifecycle status of the note.
    pub status: NoteStatus,
    /// Grade awarded when the note was hit.
    pub grade: Option<Grade>,
}

/// Immutable representation of a lane used by renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneSnapshot {
    /// Lane captured by the snapshot.
    pub lane: Lane,
    /// Notes of the lane in time order.
    pub notes: Vec<NoteSnapshot>,
}

/// Read-only snapshot of the rhythm world for renderers and overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    /// Current lifecycle state.
    pub state: GameState,
    /// Song time in seconds.
    pub song_time: f64,
    /// Accumulated score.
    pub score: u64,
    /// Consecutive hits since the last miss.
    pub combo: u32,
    /// Highest combo reached during the attempt.
    pub max_combo: u32,
    /// Judgement tallies.
    pub hit_counts: HitCounts,
    /// Most recent successful hit.
    pub last_hit: Option<HitResult>,
    /// Time left on the resume countdown, if one is running.
    pub countdown_remaining: Option<Duration>,
    /// Per-lane note states ordered as [`Lane::ALL`].
    pub lanes: Vec<LaneSnapshot>,
}

impl WorldSnapshot {
    /// Total number of notes in the attempt.
    #[must_use]
    pub fn total_notes(&self) -> usize {
        self.lanes.iter().map(|lane| lane.notes.len()).sum()
    }

    /// Number of notes that are still active.
    #[must_use]
    pub fn notes_remaining(&self) -> usize {
        self.lanes
            .iter()
            .flat_map(|lane| lane.notes.iter())
            .filter(|note| note.status == NoteStatus::Active)
            .count()
    }
}

/// Coarse difficulty bucket derived from note density.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Fewer than two notes per second.
    Chill,
    /// Fewer than four notes per second.
    Groove,
    /// Four or more notes per second.
    Virtuoso,
}

impl Difficulty {
    /// Classifies a chart from its playable note count and duration in seconds.
    #[must_use]
    pub fn from_density(total_notes: u32, duration: f64) -> Self {
        if !duration.is_finite() || duration <= 0.0 {
            return Self::Virtuoso;
        }

        let per_second = f64::from(total_notes) / duration;
        if per_second < 2.0 {
            Self::Chill
        } else if per_second < 4.0 {
            Self::Groove
        } else {
            Self::Virtuoso
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Chill => "Chill",
            Self::Groove => "Groove",
            Self::Virtuoso => "Virtuoso",
        };
        f.write_str(label)
    }
}

/// Stable digest identifying a prepared chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartFingerprint(u64);

impl ChartFingerprint {
    /// Wraps a raw digest value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the raw digest value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChartFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Summary of a playable song shown on the song-select menu.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SongEntry {
    /// Display name of the song.
    pub name: String,
    /// Primary tempo in beats per minute.
    pub bpm: f64,
    /// Song length in seconds.
    pub duration: f64,
    /// Number of playable notes after preparation.
    pub total_notes: u32,
    /// Density-derived difficulty bucket.
    pub difficulty: Difficulty,
    /// Digest identifying the prepared chart.
    pub fingerprint: ChartFingerprint,
}

/// Audio transport that owns the authoritative song clock.
///
/// The engine never integrates tick deltas into song time; it reads
/// [`Transport::now`] once per tick and forwards state transitions as
/// playback requests.
pub trait Transport {
    /// Current song time in seconds; monotonic while playing, frozen while paused.
    fn now(&self) -> f64;

    /// Starts or resumes playback.
    fn play(&mut self);

    /// Freezes playback at the current position.
    fn pause(&mut self);

    /// Prepares the output device after the first user gesture.
    fn unlock(&mut self);

    /// Moves the playhead back to the start of the song.
    fn rewind(&mut self);
}
