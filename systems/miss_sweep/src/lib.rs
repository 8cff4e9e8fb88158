#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that retires notes which aged past the loosest hit window.

use keyfall_core::{Command, HitWindows, Lane, NoteId, NoteView};

/// Stateless sweeper that proposes [`Command::MarkMissed`] for unreachable notes.
#[derive(Debug, Default)]
pub struct MissSweep;

impl MissSweep {
    /// Creates a new sweeper.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scans each lane up to the playhead and emits a miss for every stale active note.
    ///
    /// A note is stale once `song_time - note.time` exceeds the loosest window.
    /// The scan of a lane stops at the first note still ahead of `song_time`.
    /// Running the sweep twice at the same time emits nothing new once the first
    /// batch has been applied.
    pub fn handle(
        &mut self,
        song_time: f64,
        notes: NoteView<'_>,
        windows: &HitWindows,
        out: &mut Vec<Command>,
    ) {
        let outer = windows.outer();

        for lane in Lane::ALL {
            for (index, note) in notes.lane(lane).iter().enumerate() {
                if note.time() > song_time {
                    break;
                }
                if note.is_active() && song_time - note.time() > outer {
                    out.push(Command::MarkMissed {
                        note: NoteId::new(lane, index as u32),
                    });
                }
            }
        }
    }
}
