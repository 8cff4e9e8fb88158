//! Reduction of dense passages into a playable note stream.

use keyfall_core::{NoteRecord, ThinningConfig};

/// Thins a time-sorted note stream.
///
/// Notes sharing a lane and an instant collapse to the loudest one. Instants
/// closer than `quick_note_gap` to their predecessor extend a quick run, and
/// only every `note_thin_rate`-th instant of a run is kept; the first instant
/// of a run always survives and chords are kept or dropped as a unit.
pub(crate) fn thin(notes: Vec<NoteRecord>, config: &ThinningConfig) -> Vec<NoteRecord> {
    let deduped = collapse_unisons(notes);
    if config.note_thin_rate <= 1 {
        return deduped;
    }

    let mut kept = Vec::with_capacity(deduped.len());
    let mut previous_instant: Option<f64> = None;
    let mut run_position = 0_u32;
    let mut keep_instant = true;

    for note in deduped {
        if previous_instant != Some(note.time) {
            let quick = previous_instant
                .is_some_and(|previous| note.time - previous < config.quick_note_gap);
            run_position = if quick { run_position + 1 } else { 0 };
            keep_instant = run_position % config.note_thin_rate == 0;
            previous_instant = Some(note.time);
        }

        if keep_instant {
            kept.push(note);
        }
    }

    kept
}

fn collapse_unisons(notes: Vec<NoteRecord>) -> Vec<NoteRecord> {
    let mut collapsed: Vec<NoteRecord> = Vec::with_capacity(notes.len());

    for note in notes {
        let twin = collapsed
            .iter_mut()
            .rev()
            .take_while(|existing| existing.time == note.time)
            .find(|existing| existing.lane == note.lane);

        match twin {
            Some(existing) => {
                if note.velocity > existing.velocity {
                    *existing = note;
                }
            }
            None => collapsed.push(note),
        }
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyfall_core::Lane;

    fn note(time: f64, lane: Lane, velocity: f32) -> NoteRecord {
        NoteRecord {
            time,
            lane,
            duration: 0.05,
            velocity,
            pitch: 60,
        }
    }

    fn times(notes: &[NoteRecord]) -> Vec<f64> {
        notes.iter().map(|note| note.time).collect()
    }

    const DEFAULTS: ThinningConfig = ThinningConfig {
        quick_note_gap: 0.12,
        note_thin_rate: 3,
    };

    #[test]
    fn unisons_keep_the_loudest_note() {
        let thinned = thin(
            vec![
                note(1.0, Lane::D, 0.3),
                note(1.0, Lane::J, 0.4),
                note(1.0, Lane::D, 0.9),
            ],
            &DEFAULTS,
        );

        assert_eq!(thinned.len(), 2);
        assert_eq!(thinned[0].lane, Lane::D);
        assert!((thinned[0].velocity - 0.9).abs() < f32::EPSILON);
        assert_eq!(thinned[1].lane, Lane::J);
    }

    #[test]
    fn quick_runs_keep_every_nth_instant() {
        let run: Vec<NoteRecord> = [0.0, 0.0625, 0.125, 0.1875, 0.25, 1.0]
            .into_iter()
            .map(|time| note(time, Lane::F, 0.5))
            .collect();

        assert_eq!(times(&thin(run, &DEFAULTS)), vec![0.0, 0.1875, 1.0]);
    }

    #[test]
    fn chords_inside_runs_survive_together() {
        let notes = vec![
            note(0.0, Lane::D, 0.5),
            note(0.0, Lane::K, 0.5),
            note(0.0625, Lane::D, 0.5),
            note(0.0625, Lane::K, 0.5),
        ];

        assert_eq!(times(&thin(notes, &DEFAULTS)), vec![0.0, 0.0]);
    }

    #[test]
    fn unit_rate_disables_run_thinning() {
        let config = ThinningConfig {
            note_thin_rate: 1,
            ..DEFAULTS
        };
        let run: Vec<NoteRecord> = [0.0, 0.0625, 0.125]
            .into_iter()
            .map(|time| note(time, Lane::F, 0.5))
            .collect();

        assert_eq!(thin(run, &config).len(), 3);
    }
}
