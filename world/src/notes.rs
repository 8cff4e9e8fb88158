use keyfall_core::{Lane, Note, NoteId, NoteRecord, NoteView, LANE_COUNT};

use crate::WorldError;

/// Per-lane, time-ordered note storage owned by the world.
#[derive(Debug)]
pub(crate) struct NoteStore {
    lanes: [Vec<Note>; LANE_COUNT],
}

impl NoteStore {
    /// Partitions source records by lane, preserving their relative order.
    pub(crate) fn from_records(records: &[NoteRecord]) -> Result<Self, WorldError> {
        if records.is_empty() {
            return Err(WorldError::EmptyNoteSource);
        }

        let mut lanes: [Vec<Note>; LANE_COUNT] = Default::default();
        for (index, record) in records.iter().enumerate() {
            if !record.time.is_finite() || record.time < 0.0 {
                return Err(WorldError::InvalidNoteTime { index });
            }

            let lane = &mut lanes[record.lane.index()];
            if let Some(previous) = lane.last() {
                if record.time < previous.time() {
                    return Err(WorldError::UnsortedLane {
                        lane: record.lane,
                        index: lane.len(),
                    });
                }
            }
            lane.push(Note::from_record(record));
        }

        Ok(Self { lanes })
    }

    pub(crate) fn view(&self) -> NoteView<'_> {
        NoteView::new([
            &self.lanes[Lane::D.index()],
            &self.lanes[Lane::F.index()],
            &self.lanes[Lane::J.index()],
            &self.lanes[Lane::K.index()],
        ])
    }

    pub(crate) fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        let index = usize::try_from(id.index()).ok()?;
        self.lanes[id.lane().index()].get_mut(index)
    }

    pub(crate) fn reset(&mut self) {
        for note in self.lanes.iter_mut().flatten() {
            note.reset();
        }
    }
}
