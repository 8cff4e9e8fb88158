//! Lane assignment strategies for charts that do not fix lanes themselves.

use std::{fmt, str::FromStr};

use keyfall_core::Lane;
use serde::{Deserialize, Serialize};

use crate::{ChartError, ChartNote};

/// Policy that maps source pitches or tracks onto the four lanes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaneStrategy {
    /// Split the pitch range into four equal-width quartiles.
    #[default]
    PitchRange,
    /// Split the pitches into four equal-count buckets.
    Percentile,
    /// Assign whole tracks to lanes ordered by average pitch.
    Track,
    /// Keep the lanes stored in the chart, falling back to [`LaneStrategy::PitchRange`].
    Embedded,
}

impl LaneStrategy {
    /// Every strategy in presentation order.
    pub const ALL: [LaneStrategy; 4] = [
        LaneStrategy::PitchRange,
        LaneStrategy::Percentile,
        LaneStrategy::Track,
        LaneStrategy::Embedded,
    ];

    const fn name(self) -> &'static str {
        match self {
            Self::PitchRange => "pitch-range",
            Self::Percentile => "percentile",
            Self::Track => "track",
            Self::Embedded => "embedded",
        }
    }

    /// Assigns a lane to every note, preserving input order.
    pub(crate) fn assign(self, notes: &[&ChartNote]) -> Vec<Lane> {
        match self {
            Self::PitchRange => pitch_range(notes),
            Self::Percentile => percentile(notes),
            Self::Track => by_track(notes),
            Self::Embedded => {
                let embedded: Option<Vec<Lane>> = notes.iter().map(|note| note.lane).collect();
                embedded.unwrap_or_else(|| {
                    log::warn!("chart is missing embedded lanes; using pitch range");
                    pitch_range(notes)
                })
            }
        }
    }
}

impl fmt::Display for LaneStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LaneStrategy {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == value)
            .ok_or_else(|| ChartError::UnknownStrategy(value.to_owned()))
    }
}

fn pitch_range(notes: &[&ChartNote]) -> Vec<Lane> {
    let min = notes.iter().map(|note| note.midi).min().unwrap_or(0);
    let max = notes.iter().map(|note| note.midi).max().unwrap_or(0);
    let range = f64::from(max - min);

    notes
        .iter()
        .map(|note| {
            if range == 0.0 {
                return Lane::F;
            }
            let position = f64::from(note.midi - min) / range;
            if position <= 0.25 {
                Lane::D
            } else if position <= 0.5 {
                Lane::F
            } else if position <= 0.75 {
                Lane::J
            } else {
                Lane::K
            }
        })
        .collect()
}

fn percentile(notes: &[&ChartNote]) -> Vec<Lane> {
    let mut sorted: Vec<u8> = notes.iter().map(|note| note.midi).collect();
    sorted.sort_unstable();
    let quarter = sorted.len() / 4;
    let threshold = |slot: usize| sorted.get(quarter * slot).copied().unwrap_or(0);
    let (p25, p50, p75) = (threshold(1), threshold(2), threshold(3));

    notes
        .iter()
        .map(|note| {
            if note.midi <= p25 {
                Lane::D
            } else if note.midi <= p50 {
                Lane::F
            } else if note.midi <= p75 {
                Lane::J
            } else {
                Lane::K
            }
        })
        .collect()
}

fn by_track(notes: &[&ChartNote]) -> Vec<Lane> {
    let mut tracks: Vec<(&str, u64, u64)> = Vec::new();
    for note in notes {
        match tracks.iter_mut().find(|(name, _, _)| *name == note.track) {
            Some((_, sum, count)) => {
                *sum += u64::from(note.midi);
                *count += 1;
            }
            None => tracks.push((note.track.as_str(), u64::from(note.midi), 1)),
        }
    }

    let average = |sum: u64, count: u64| sum as f64 / count as f64;
    tracks.sort_by(|a, b| average(a.1, a.2).total_cmp(&average(b.1, b.2)));

    let track_count = tracks.len();
    notes
        .iter()
        .map(|note| {
            tracks
                .iter()
                .position(|(name, _, _)| *name == note.track)
                .and_then(|rank| Lane::from_index((rank * 4 / track_count).min(3)))
                .unwrap_or(Lane::F)
        })
        .collect()
}
