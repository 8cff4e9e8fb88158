#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that matches pending lane presses against the closest active note.

use keyfall_core::{Command, HitWindows, NoteId, NoteView, PendingInput};

/// Hit resolution system that reuses a scratch buffer of claimed notes.
#[derive(Debug, Default)]
pub struct HitResolution {
    claimed: Vec<NoteId>,
}

impl HitResolution {
    /// Creates a new resolver with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every pending input in arrival order and emits judgement commands.
    ///
    /// Each input is matched against the note statuses as they would stand after
    /// the earlier inputs of the batch were applied, so a note claimed by one
    /// press is invisible to the presses that follow it. Inputs with no active
    /// note inside the loosest window are dropped without penalty. When the batch
    /// is non-empty a trailing [`Command::ClearPendingInputs`] drains the queue.
    pub fn handle(
        &mut self,
        inputs: &[PendingInput],
        notes: NoteView<'_>,
        windows: &HitWindows,
        out: &mut Vec<Command>,
    ) {
        if inputs.is_empty() {
            return;
        }

        self.claimed.clear();
        for input in inputs {
            let Some((note, distance)) = self.closest_active(input, notes) else {
                continue;
            };
            let Some(grade) = windows.grade_for(distance) else {
                continue;
            };

            self.claimed.push(note);
            out.push(Command::JudgeNote {
                note,
                grade,
                input_time: input.time,
            });
        }

        out.push(Command::ClearPendingInputs);
    }

    fn closest_active(&self, input: &PendingInput, notes: NoteView<'_>) -> Option<(NoteId, f64)> {
        let mut best: Option<(NoteId, f64)> = None;

        for (index, note) in notes.lane(input.lane).iter().enumerate() {
            let id = NoteId::new(input.lane, index as u32);
            if !note.is_active() || self.claimed.contains(&id) {
                continue;
            }

            let distance = (note.time() - input.time).abs();
            match best {
                Some((_, best_distance)) if distance < best_distance => {
                    best = Some((id, distance));
                }
                Some(_) => {
                    if note.time() > input.time {
                        break;
                    }
                }
                None => best = Some((id, distance)),
            }
        }

        best
    }
}
