#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chart loading and note source preparation.
//!
//! Charts arrive as flattened JSON documents describing the notes of a MIDI
//! performance. Preparation validates the notes, assigns lanes, thins dense
//! passages and produces the time-ordered [`NoteRecord`] list a rhythm world is
//! constructed from, together with the [`SongEntry`] shown on the song menu.

use keyfall_core::{
    ChartFingerprint, Difficulty, Lane, NoteRecord, SongEntry, ThinningConfig, LANE_COUNT,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

mod strategy;
mod thinning;

pub use strategy::LaneStrategy;

/// Pre-converted chart document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDocument {
    /// Display name of the song.
    pub name: String,
    /// Primary tempo in beats per minute.
    #[serde(default)]
    pub bpm: f64,
    /// Song length in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Pulses per quarter note of the source file.
    #[serde(default)]
    pub ppq: u32,
    /// Note count reported by the converter, before preparation.
    #[serde(default)]
    pub total_notes: u32,
    /// Lowest and highest source pitch.
    #[serde(default)]
    pub note_range: Option<NoteRange>,
    /// Per-track summaries.
    #[serde(default)]
    pub tracks: Vec<TrackSummary>,
    /// Every source note.
    pub notes: Vec<ChartNote>,
}

impl ChartDocument {
    /// Parses a chart from its JSON representation.
    pub fn from_json(text: &str) -> Result<Self, ChartError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Inclusive pitch bounds of a chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRange {
    /// Lowest pitch.
    pub min: u8,
    /// Highest pitch.
    pub max: u8,
}

/// Summary of a single source track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    /// Track name referenced by [`ChartNote::track`].
    pub name: String,
    /// Instrument name.
    #[serde(default)]
    pub instrument: String,
    /// MIDI channel.
    #[serde(default)]
    pub channel: u8,
    /// Number of notes in the track.
    #[serde(default)]
    pub note_count: u32,
}

/// Source note as stored in a chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartNote {
    /// Absolute start time in seconds.
    pub time: f64,
    /// Sounding duration in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Source pitch.
    pub midi: u8,
    /// Normalised loudness.
    #[serde(default)]
    pub velocity: f32,
    /// Name of the track the note belongs to.
    #[serde(default)]
    pub track: String,
    /// MIDI channel.
    #[serde(default)]
    pub channel: u8,
    /// Lane chosen by the converter, if any.
    #[serde(default)]
    pub lane: Option<Lane>,
    /// Original note number, if it differs from `midi`.
    #[serde(default)]
    pub note_number: Option<u8>,
}

impl ChartNote {
    fn is_playable(&self) -> bool {
        self.time.is_finite()
            && self.time >= 0.0
            && self.duration.is_finite()
            && self.duration >= 0.0
            && self.velocity.is_finite()
    }
}

/// Prepared note source ready for world construction.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedChart {
    /// Song menu summary.
    pub entry: SongEntry,
    /// Playable notes in non-decreasing time order.
    pub notes: Vec<NoteRecord>,
}

/// Errors raised while loading or preparing charts.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The document was not valid chart JSON.
    #[error("failed to parse chart: {0}")]
    Parse(#[from] serde_json::Error),
    /// No playable notes survived preparation.
    #[error("chart '{name}' has no playable notes")]
    Empty {
        /// Name of the offending chart.
        name: String,
    },
    /// A lane strategy name was not recognised.
    #[error("unknown lane strategy '{0}'")]
    UnknownStrategy(String),
}

/// Validates, lane-assigns and thins a chart into a playable note source.
pub fn prepare(
    document: &ChartDocument,
    strategy: LaneStrategy,
    thinning: &ThinningConfig,
) -> Result<PreparedChart, ChartError> {
    let playable: Vec<&ChartNote> = document
        .notes
        .iter()
        .filter(|note| note.is_playable())
        .collect();
    let dropped = document.notes.len() - playable.len();
    if dropped > 0 {
        log::warn!(
            "dropped {dropped} malformed notes from chart '{}'",
            document.name
        );
    }
    if playable.is_empty() {
        return Err(ChartError::Empty {
            name: document.name.clone(),
        });
    }

    let lanes = strategy.assign(&playable);
    let mut notes: Vec<NoteRecord> = playable
        .iter()
        .zip(lanes)
        .map(|(note, lane)| NoteRecord {
            time: note.time,
            lane,
            duration: note.duration,
            velocity: note.velocity.clamp(0.0, 1.0),
            pitch: note.note_number.unwrap_or(note.midi),
        })
        .collect();
    notes.sort_by(|a, b| a.time.total_cmp(&b.time));

    let source_count = notes.len();
    let notes = thinning::thin(notes, thinning);
    log::debug!(
        "prepared '{}' with {strategy}: {} of {source_count} notes kept",
        document.name,
        notes.len()
    );

    let total_notes = u32::try_from(notes.len()).unwrap_or(u32::MAX);
    let duration = song_length(document.duration, &notes);
    let entry = SongEntry {
        name: document.name.clone(),
        bpm: document.bpm,
        duration,
        total_notes,
        difficulty: Difficulty::from_density(total_notes, duration),
        fingerprint: fingerprint(&document.name, &notes),
    };

    Ok(PreparedChart { entry, notes })
}

/// Number of notes assigned to each lane, ordered as [`Lane::ALL`].
#[must_use]
pub fn lane_distribution(notes: &[NoteRecord]) -> [u32; LANE_COUNT] {
    let mut distribution = [0_u32; LANE_COUNT];
    for note in notes {
        distribution[note.lane.index()] += 1;
    }
    distribution
}

/// Stable digest over a chart's name and prepared notes.
#[must_use]
pub fn fingerprint(name: &str, notes: &[NoteRecord]) -> ChartFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    for note in notes {
        hasher.update(note.time.to_bits().to_le_bytes());
        hasher.update([note.lane.index() as u8, note.pitch]);
    }

    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    ChartFingerprint::new(u64::from_le_bytes(bytes))
}

fn song_length(declared: f64, notes: &[NoteRecord]) -> f64 {
    if declared.is_finite() && declared > 0.0 {
        return declared;
    }

    notes
        .iter()
        .map(|note| note.time + note.duration)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(time: f64, midi: u8) -> ChartNote {
        ChartNote {
            time,
            duration: 0.25,
            midi,
            velocity: 0.8,
            track: "piano".to_owned(),
            channel: 0,
            lane: None,
            note_number: None,
        }
    }

    fn document(notes: Vec<ChartNote>) -> ChartDocument {
        ChartDocument {
            name: "Etude".to_owned(),
            bpm: 120.0,
            duration: 4.0,
            ppq: 480,
            total_notes: notes.len() as u32,
            note_range: None,
            tracks: Vec::new(),
            notes,
        }
    }

    fn no_thinning() -> ThinningConfig {
        ThinningConfig {
            quick_note_gap: 0.0,
            note_thin_rate: 1,
        }
    }

    #[test]
    fn prepared_notes_are_time_sorted_per_lane() {
        let chart = document(vec![note(2.0, 80), note(0.5, 40), note(1.0, 80), note(1.5, 40)]);

        let prepared = prepare(&chart, LaneStrategy::PitchRange, &no_thinning()).expect("prepared");

        let times: Vec<f64> = prepared.notes.iter().map(|note| note.time).collect();
        assert_eq!(times, vec![0.5, 1.0, 1.5, 2.0]);
        assert_eq!(lane_distribution(&prepared.notes), [2, 0, 0, 2]);
        assert_eq!(prepared.entry.total_notes, 4);
        assert_eq!(prepared.entry.difficulty, Difficulty::Chill);
    }

    #[test]
    fn malformed_notes_are_dropped() {
        let negative = note(-1.0, 60);
        let mut endless = note(1.0, 60);
        endless.duration = f64::INFINITY;
        let chart = document(vec![negative, endless, note(f64::NAN, 60), note(3.0, 60)]);

        let prepared = prepare(&chart, LaneStrategy::PitchRange, &no_thinning()).expect("prepared");

        assert_eq!(prepared.notes.len(), 1);
    }

    #[test]
    fn chart_without_playable_notes_is_rejected() {
        let chart = document(vec![note(f64::NAN, 60)]);

        let error = prepare(&chart, LaneStrategy::Percentile, &no_thinning()).expect_err("empty");

        assert!(matches!(error, ChartError::Empty { name } if name == "Etude"));
    }

    #[test]
    fn fingerprint_depends_on_prepared_notes() {
        let chart = document(vec![note(0.5, 40), note(1.0, 80)]);
        let first = prepare(&chart, LaneStrategy::PitchRange, &no_thinning()).expect("prepared");
        let again = prepare(&chart, LaneStrategy::PitchRange, &no_thinning()).expect("prepared");
        let remapped = prepare(&chart, LaneStrategy::Track, &no_thinning()).expect("prepared");

        assert_eq!(first.entry.fingerprint, again.entry.fingerprint);
        assert_ne!(first.entry.fingerprint, remapped.entry.fingerprint);
    }

    #[test]
    fn missing_duration_falls_back_to_last_note_end() {
        let mut chart = document(vec![note(0.5, 40), note(9.75, 80)]);
        chart.duration = 0.0;

        let prepared = prepare(&chart, LaneStrategy::PitchRange, &no_thinning()).expect("prepared");

        assert!((prepared.entry.duration - 10.0).abs() < f64::EPSILON);
    }
}
