//! Gameplay tuning values threaded into the resolver, sweeper and ledger.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Grade;

/// Tunable gameplay parameters.
///
/// Every field carries a documented default so partial configuration files can
/// be layered over [`GameplayConfig::default`], which doubles as the
/// reset-to-default value for live tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Maximum distance in seconds that still grades as Perfect. Default 0.05.
    pub perfect_window: f64,
    /// Maximum distance in seconds that still grades as Great. Default 0.10.
    pub great_window: f64,
    /// Maximum distance in seconds that still grades as Good. Default 0.15.
    pub good_window: f64,
    /// Base points for a Perfect hit. Default 300.
    pub perfect_points: u32,
    /// Base points for a Great hit. Default 200.
    pub great_points: u32,
    /// Base points for a Good hit. Default 100.
    pub good_points: u32,
    /// Number of consecutive hits per multiplier step. Default 10.
    pub combo_step: u32,
    /// Multiplier bonus added per completed combo step. Default 0.1.
    pub combo_bonus_pct: f64,
    /// Length of the resume countdown in seconds. Default 3.
    pub countdown_seconds: f64,
    /// Gap in seconds below which consecutive notes count as a quick run. Default 0.12.
    pub quick_note_gap: f64,
    /// Keep one of every `note_thin_rate` notes inside a quick run. Default 3.
    pub note_thin_rate: u32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            perfect_window: 0.05,
            great_window: 0.10,
            good_window: 0.15,
            perfect_points: 300,
            great_points: 200,
            good_points: 100,
            combo_step: 10,
            combo_bonus_pct: 0.1,
            countdown_seconds: 3.0,
            quick_note_gap: 0.12,
            note_thin_rate: 3,
        }
    }
}

impl GameplayConfig {
    /// Checks that the configuration describes a usable grading scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (grade, window) in [
            (Grade::Perfect, self.perfect_window),
            (Grade::Great, self.great_window),
            (Grade::Good, self.good_window),
        ] {
            if !window.is_finite() || window <= 0.0 {
                return Err(ConfigError::NonPositiveWindow { grade });
            }
        }

        if self.perfect_window >= self.great_window || self.great_window >= self.good_window {
            return Err(ConfigError::UnorderedWindows);
        }

        if self.combo_step == 0 {
            return Err(ConfigError::ZeroComboStep);
        }

        if !self.combo_bonus_pct.is_finite() || self.combo_bonus_pct < 0.0 {
            return Err(ConfigError::InvalidComboBonus);
        }

        if !self.countdown_seconds.is_finite() || self.countdown_seconds < 0.0 {
            return Err(ConfigError::InvalidCountdown);
        }

        if !self.quick_note_gap.is_finite() || self.quick_note_gap < 0.0 {
            return Err(ConfigError::InvalidQuickNoteGap);
        }

        Ok(())
    }

    /// Hit windows ordered from tightest to loosest.
    #[must_use]
    pub fn windows(&self) -> HitWindows {
        HitWindows {
            perfect: self.perfect_window,
            great: self.great_window,
            good: self.good_window,
        }
    }

    /// Base points awarded for a grade before the combo multiplier.
    #[must_use]
    pub const fn base_points(&self, grade: Grade) -> u32 {
        match grade {
            Grade::Perfect => self.perfect_points,
            Grade::Great => self.great_points,
            Grade::Good => self.good_points,
        }
    }

    /// Combo multiplier applied to a hit landed while holding `combo`.
    ///
    /// Computed as `1 + floor(combo / combo_step) * combo_bonus_pct`.
    #[must_use]
    pub fn combo_multiplier(&self, combo: u32) -> f64 {
        let steps = combo / self.combo_step.max(1);
        1.0 + f64::from(steps) * self.combo_bonus_pct
    }

    /// Points credited for a hit of `grade` landed while holding `combo`.
    #[must_use]
    pub fn award(&self, grade: Grade, combo: u32) -> u64 {
        let points = f64::from(self.base_points(grade)) * self.combo_multiplier(combo);
        points.round().max(0.0) as u64
    }

    /// Resume countdown as a duration.
    #[must_use]
    pub fn countdown(&self) -> Duration {
        Duration::try_from_secs_f64(self.countdown_seconds).unwrap_or(Duration::ZERO)
    }

    /// Thinning parameters applied while preparing note sources.
    #[must_use]
    pub const fn thinning(&self) -> ThinningConfig {
        ThinningConfig {
            quick_note_gap: self.quick_note_gap,
            note_thin_rate: self.note_thin_rate,
        }
    }
}

/// Grading windows measured as absolute distance in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitWindows {
    /// Perfect window.
    pub perfect: f64,
    /// Great window.
    pub great: f64,
    /// Good window, the loosest.
    pub good: f64,
}

impl HitWindows {
    /// Grades a timing distance, preferring the tightest window it satisfies.
    ///
    /// Returns `None` when the distance falls outside the loosest window.
    #[must_use]
    pub fn grade_for(&self, distance: f64) -> Option<Grade> {
        [
            (Grade::Perfect, self.perfect),
            (Grade::Great, self.great),
            (Grade::Good, self.good),
        ]
        .into_iter()
        .find(|(_, window)| distance <= *window)
        .map(|(grade, _)| grade)
    }

    /// Loosest window; notes older than this can no longer be hit.
    #[must_use]
    pub const fn outer(&self) -> f64 {
        self.good
    }
}

/// Parameters controlling how dense passages are thinned upstream of the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThinningConfig {
    /// Gap in seconds below which consecutive notes form a quick run.
    pub quick_note_gap: f64,
    /// Keep one of every `note_thin_rate` notes inside a quick run.
    pub note_thin_rate: u32,
}

/// Reasons a gameplay configuration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A hit window was zero, negative or not a number.
    #[error("{grade} window must be a positive number of seconds")]
    NonPositiveWindow {
        /// Grade whose window failed validation.
        grade: Grade,
    },
    /// The windows do not strictly widen from Perfect to Good.
    #[error("hit windows must widen strictly from perfect to great to good")]
    UnorderedWindows,
    /// The combo step was zero.
    #[error("combo step must be at least one hit")]
    ZeroComboStep,
    /// The combo bonus was negative or not a number.
    #[error("combo bonus must be a non-negative fraction")]
    InvalidComboBonus,
    /// The countdown length was negative or not a number.
    #[error("countdown must be a non-negative number of seconds")]
    InvalidCountdown,
    /// The quick note gap was negative or not a number.
    #[error("quick note gap must be a non-negative number of seconds")]
    InvalidQuickNoteGap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(GameplayConfig::default().validate(), Ok(()));
    }

    #[test]
    fn grading_prefers_tightest_window_on_ties() {
        let windows = GameplayConfig::default().windows();
        assert_eq!(windows.grade_for(0.0), Some(Grade::Perfect));
        assert_eq!(windows.grade_for(0.05), Some(Grade::Perfect));
        assert_eq!(windows.grade_for(0.07), Some(Grade::Great));
        assert_eq!(windows.grade_for(0.10), Some(Grade::Great));
        assert_eq!(windows.grade_for(0.12), Some(Grade::Good));
        assert_eq!(windows.grade_for(0.15), Some(Grade::Good));
        assert_eq!(windows.grade_for(0.151), None);
    }

    #[test]
    fn award_applies_combo_multiplier_in_steps() {
        let config = GameplayConfig::default();
        assert_eq!(config.award(Grade::Perfect, 0), 300);
        assert_eq!(config.award(Grade::Perfect, 9), 300);
        assert_eq!(config.award(Grade::Perfect, 10), 330);
        assert_eq!(config.award(Grade::Great, 25), 240);
        assert_eq!(config.award(Grade::Good, 100), 200);
    }

    #[test]
    fn validation_rejects_unordered_windows() {
        let config = GameplayConfig {
            great_window: 0.2,
            ..GameplayConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::UnorderedWindows));
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let zero_window = GameplayConfig {
            perfect_window: 0.0,
            ..GameplayConfig::default()
        };
        assert_eq!(
            zero_window.validate(),
            Err(ConfigError::NonPositiveWindow {
                grade: Grade::Perfect
            })
        );

        let zero_step = GameplayConfig {
            combo_step: 0,
            ..GameplayConfig::default()
        };
        assert_eq!(zero_step.validate(), Err(ConfigError::ZeroComboStep));

        let negative_countdown = GameplayConfig {
            countdown_seconds: -1.0,
            ..GameplayConfig::default()
        };
        assert_eq!(
            negative_countdown.validate(),
            Err(ConfigError::InvalidCountdown)
        );
    }

    #[test]
    fn countdown_converts_to_duration() {
        let config = GameplayConfig::default();
        assert_eq!(config.countdown(), Duration::from_secs(3));
    }
}
