use keyfall_core::{GameplayConfig, Grade, HitCounts, HitResult};

/// Score, combo and judgement tallies for the current attempt.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    score: u64,
    combo: u32,
    max_combo: u32,
    hit_counts: HitCounts,
    last_hit: Option<HitResult>,
}

impl Ledger {
    /// Credits a hit and returns the points awarded.
    ///
    /// The multiplier uses the combo held before this hit.
    pub(crate) fn record_hit(
        &mut self,
        grade: Grade,
        input_time: f64,
        config: &GameplayConfig,
    ) -> u64 {
        let points = config.award(grade, self.combo);
        self.score = self.score.saturating_add(points);
        self.combo = self.combo.saturating_add(1);
        self.max_combo = self.max_combo.max(self.combo);
        self.hit_counts.record(grade);
        self.last_hit = Some(HitResult {
            grade,
            time: input_time,
        });
        points
    }

    /// Records a miss and returns the combo it broke.
    pub(crate) fn record_miss(&mut self) -> u32 {
        let broken = self.combo;
        self.combo = 0;
        self.hit_counts.record_miss();
        broken
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn score(&self) -> u64 {
        self.score
    }

    pub(crate) fn combo(&self) -> u32 {
        self.combo
    }

    pub(crate) fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub(crate) fn hit_counts(&self) -> HitCounts {
        self.hit_counts
    }

    pub(crate) fn last_hit(&self) -> Option<HitResult> {
        self.last_hit
    }
}
