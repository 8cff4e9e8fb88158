#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Keyfall adapters.
//!
//! Backends never read the world directly. Every frame the driver turns a
//! [`WorldSnapshot`] (or the song library) into a declarative [`Scene`] and the
//! backend draws whatever the scene describes.

use anyhow::Result as AnyResult;
use glam::Vec2;
use keyfall_core::{
    GameState, Grade, HitCounts, Lane, NoteId, NoteStatus, SongEntry, WorldSnapshot, LANE_COUNT,
};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt, time::Duration};

/// Distance in pixels a note may travel beyond the viewport before it is culled.
pub const NOTE_CULL_BUFFER: f32 = 40.0;

const LANE_GUIDE_WIDTH: f32 = 4.0;
const MENU_FIRST_CARD_TOP: f32 = 140.0;
const MENU_CARD_STRIDE: f32 = 84.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            red: ((rgb >> 16) & 0xff) as f32 / 255.0,
            green: ((rgb >> 8) & 0xff) as f32 / 255.0,
            blue: (rgb & 0xff) as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fixed colors used by every backend.
pub mod palette {
    use super::Color;

    /// Frame clear color.
    pub const BACKGROUND: Color = Color::from_hex(0x14_10_24);
    /// Vertical guide drawn along each lane.
    pub const LANE_GUIDE: Color = Color::new(1.0, 1.0, 1.0, 0.35);
    /// Hit zone at rest.
    pub const HIT_ZONE: Color = Color::from_hex(0xff_e0_66);
    /// Hit zone while its lane key is held.
    pub const HIT_ZONE_PRESSED: Color = Color::from_hex(0xd6_5a_4a);
    /// Translucent halo around a falling note.
    pub const NOTE_GLOW: Color = Color::new(1.0, 0.843, 0.0, 0.25);
    /// Solid body of a falling note.
    pub const NOTE_BODY: Color = Color::from_hex(0xff_f8_dc);
    /// HUD and overlay text.
    pub const TEXT: Color = Color::from_hex(0xf5_f5_f5);
    /// Dimmed backdrop behind overlays.
    pub const OVERLAY_SHADE: Color = Color::new(0.0, 0.0, 0.0, 0.6);
    /// Song card on the menu.
    pub const CARD: Color = Color::from_hex(0x2a_24_44);
    /// Highlighted song card on the menu.
    pub const CARD_HIGHLIGHT: Color = Color::from_hex(0x5b_4b_9a);
}

/// Layout and timing knobs for presenting gameplay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Pixels a note travels per second of song time.
    pub scroll_speed: f32,
    /// Width of a hit zone in pixels.
    pub note_width: f32,
    /// Vertical position of the hit zones.
    pub hit_zone_y: f32,
    /// Height of a hit zone in pixels.
    pub hit_zone_height: f32,
    /// Horizontal distance between lane centres.
    pub lane_spacing: f32,
    /// Horizontal position of the leftmost lane.
    pub first_lane_x: f32,
    /// Radius of the translucent note halo.
    pub glow_radius: f32,
    /// Radius of the solid note body.
    pub inner_radius: f32,
    /// Seconds a grade stays visible after a hit.
    pub hit_feedback_duration: f64,
    /// Height of the visible playfield.
    pub viewport_height: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 300.0,
            note_width: 64.0,
            hit_zone_y: 680.0,
            hit_zone_height: 14.0,
            lane_spacing: 80.0,
            first_lane_x: 260.0,
            glow_radius: 20.0,
            inner_radius: 14.0,
            hit_feedback_duration: 0.4,
            viewport_height: 760.0,
        }
    }
}

impl VisualConfig {
    /// Rejects values that would collapse or invert the playfield.
    pub fn validate(&self) -> Result<(), RenderingError> {
        let positive = [
            ("scroll_speed", f64::from(self.scroll_speed)),
            ("note_width", f64::from(self.note_width)),
            ("hit_zone_height", f64::from(self.hit_zone_height)),
            ("lane_spacing", f64::from(self.lane_spacing)),
            ("hit_feedback_duration", self.hit_feedback_duration),
            ("viewport_height", f64::from(self.viewport_height)),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(RenderingError::NonPositive { field });
            }
        }
        if self.inner_radius > self.glow_radius {
            return Err(RenderingError::InnerRadiusExceedsGlow);
        }
        Ok(())
    }

    /// Horizontal centre of the lane.
    #[must_use]
    pub fn lane_x(&self, lane: Lane) -> f32 {
        self.first_lane_x + lane.index() as f32 * self.lane_spacing
    }

    /// Screen height of a note at `note_time` when the playhead is at `song_time`.
    ///
    /// Notes in the future sit above the hit zone; the subtraction is done in
    /// song-time precision before narrowing to pixels.
    #[must_use]
    pub fn note_y(&self, note_time: f64, song_time: f64) -> f32 {
        let offset = (note_time - song_time) * f64::from(self.scroll_speed);
        (f64::from(self.hit_zone_y) - offset) as f32
    }

    /// Width of the window needed to show every lane with equal margins.
    #[must_use]
    pub fn viewport_width(&self) -> f32 {
        let last = self.lane_x(Lane::K);
        last + self.first_lane_x
    }
}

/// Lane guide and hit zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLane {
    /// Lane being drawn.
    pub lane: Lane,
    /// Horizontal centre of the lane.
    pub x: f32,
    /// Width of the vertical guide line.
    pub guide_width: f32,
    /// Top-left corner of the hit zone.
    pub hit_zone_origin: Vec2,
    /// Width and height of the hit zone.
    pub hit_zone_size: Vec2,
    /// Whether the lane key is held.
    pub pressed: bool,
}

impl SceneLane {
    /// Colour of the hit zone, highlighted while pressed.
    #[must_use]
    pub const fn hit_zone_color(&self) -> Color {
        if self.pressed {
            palette::HIT_ZONE_PRESSED
        } else {
            palette::HIT_ZONE
        }
    }
}

/// Falling note inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneNote {
    /// Note identifier, useful for backend-side effects.
    pub id: NoteId,
    /// Screen position of the note centre.
    pub center: Vec2,
    /// Radius of the translucent halo.
    pub glow_radius: f32,
    /// Radius of the solid body.
    pub inner_radius: f32,
}

/// Grade feedback fading out after a hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitFeedback {
    /// Grade of the most recent hit.
    pub grade: Grade,
    /// Remaining opacity in the range 0.0..=1.0.
    pub alpha: f32,
}

/// Heads-up display drawn during gameplay.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Title of the song being played.
    pub title: String,
    /// Accumulated score.
    pub score: u64,
    /// Current combo.
    pub combo: u32,
    /// Transient grade feedback, if a hit is recent enough.
    pub feedback: Option<HitFeedback>,
}

/// Modal layer drawn on top of the playfield.
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    /// Waiting for the arm key.
    Start,
    /// Play is suspended.
    Paused,
    /// Resume countdown with whole seconds remaining.
    Countdown {
        /// Seconds left, rounded up.
        seconds: u64,
    },
    /// End-of-song summary.
    GameOver {
        /// Final score.
        score: u64,
        /// Longest combo reached.
        max_combo: u32,
        /// Judgement tallies.
        hit_counts: HitCounts,
    },
}

impl Overlay {
    fn for_snapshot(snapshot: &WorldSnapshot) -> Option<Self> {
        match snapshot.state {
            GameState::Start => Some(Self::Start),
            GameState::Paused => Some(Self::Paused),
            GameState::Countdown => Some(Self::Countdown {
                seconds: whole_seconds(snapshot.countdown_remaining.unwrap_or_default()),
            }),
            GameState::GameOver => Some(Self::GameOver {
                score: snapshot.score,
                max_combo: snapshot.max_combo,
                hit_counts: snapshot.hit_counts,
            }),
            GameState::Playing | GameState::SongSelect => None,
        }
    }

    /// Text lines shown by the overlay, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Start => vec!["Press Space to start".to_owned()],
            Self::Paused => vec![
                "Paused".to_owned(),
                "Esc to resume, Enter for song select".to_owned(),
            ],
            Self::Countdown { seconds } => vec![seconds.to_string()],
            Self::GameOver {
                score,
                max_combo,
                hit_counts,
            } => {
                let mut lines = vec![
                    "Song complete".to_owned(),
                    format!("Score {score}"),
                    format!("Max combo {max_combo}"),
                ];
                lines.extend(
                    Grade::ALL
                        .iter()
                        .map(|grade| format!("{grade} {}", hit_counts.grade(*grade))),
                );
                lines.push(format!("Miss {}", hit_counts.missed()));
                lines.push("Press any key to play again".to_owned());
                lines
            }
        }
    }
}

fn whole_seconds(remaining: Duration) -> u64 {
    let seconds = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        seconds + 1
    } else {
        seconds
    }
}

/// Song card on the selection menu.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuCard {
    /// Song name.
    pub title: String,
    /// Tempo, difficulty and note count.
    pub detail: String,
    /// Vertical position of the card's top edge.
    pub top: f32,
    /// Whether the card is the current selection.
    pub highlighted: bool,
}

/// Declarative frame content consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Lane guides and hit zones.
    pub lanes: Vec<SceneLane>,
    /// Visible active notes.
    pub notes: Vec<SceneNote>,
    /// Gameplay heads-up display.
    pub hud: Option<Hud>,
    /// Modal layer over the playfield.
    pub overlay: Option<Overlay>,
    /// Song selection cards, empty during gameplay.
    pub menu: Vec<MenuCard>,
}

impl Scene {
    /// Describes a gameplay frame.
    #[must_use]
    pub fn gameplay(
        snapshot: &WorldSnapshot,
        pressed: [bool; LANE_COUNT],
        visuals: &VisualConfig,
        title: &str,
    ) -> Self {
        let lanes = Lane::ALL
            .iter()
            .map(|&lane| {
                let x = visuals.lane_x(lane);
                SceneLane {
                    lane,
                    x,
                    guide_width: LANE_GUIDE_WIDTH,
                    hit_zone_origin: Vec2::new(x - visuals.note_width / 2.0, visuals.hit_zone_y),
                    hit_zone_size: Vec2::new(visuals.note_width, visuals.hit_zone_height),
                    pressed: pressed[lane.index()],
                }
            })
            .collect();

        Self {
            lanes,
            notes: visible_notes(snapshot, visuals),
            hud: Some(Hud {
                title: title.to_owned(),
                score: snapshot.score,
                combo: snapshot.combo,
                feedback: feedback(snapshot, visuals),
            }),
            overlay: Overlay::for_snapshot(snapshot),
            menu: Vec::new(),
        }
    }

    /// Describes the song selection menu.
    #[must_use]
    pub fn song_select(songs: &[SongEntry], highlight: usize) -> Self {
        let menu = songs
            .iter()
            .enumerate()
            .map(|(index, song)| MenuCard {
                title: song.name.clone(),
                detail: format!(
                    "{:.0} BPM  {}  {} notes",
                    song.bpm, song.difficulty, song.total_notes
                ),
                top: MENU_FIRST_CARD_TOP + index as f32 * MENU_CARD_STRIDE,
                highlighted: index == highlight,
            })
            .collect();

        Self {
            menu,
            ..Self::default()
        }
    }
}

fn visible_notes(snapshot: &WorldSnapshot, visuals: &VisualConfig) -> Vec<SceneNote> {
    let bottom = visuals.viewport_height + NOTE_CULL_BUFFER;
    let top = -NOTE_CULL_BUFFER;
    let mut notes = Vec::new();

    for lane in &snapshot.lanes {
        let x = visuals.lane_x(lane.lane);
        for note in &lane.notes {
            if note.status != NoteStatus::Active {
                continue;
            }
            let y = visuals.note_y(note.time, snapshot.song_time);
            if y > bottom {
                continue;
            }
            if y < top {
                break;
            }
            notes.push(SceneNote {
                id: note.id,
                center: Vec2::new(x, y),
                glow_radius: visuals.glow_radius,
                inner_radius: visuals.inner_radius,
            });
        }
    }

    notes
}

fn feedback(snapshot: &WorldSnapshot, visuals: &VisualConfig) -> Option<HitFeedback> {
    let hit = snapshot.last_hit?;
    let elapsed = snapshot.song_time - hit.time;
    if elapsed < 0.0 || elapsed >= visuals.hit_feedback_duration {
        return None;
    }

    Some(HitFeedback {
        grade: hit.grade,
        alpha: (1.0 - elapsed / visuals.hit_feedback_duration) as f32,
    })
}

/// Keys whose state changed since the previous frame.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Key codes pressed this frame, in DOM `code` form (`"KeyD"`, `"Space"`).
    pub pressed: Vec<String>,
    /// Key codes released this frame.
    pub released: Vec<String>,
}

/// Describes how the scene should be presented.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Window size in pixels.
    pub viewport: Vec2,
    /// Scene content that should be displayed first.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a presentation sized to the visual configuration.
    #[must_use]
    pub fn new<T>(window_title: T, visuals: &VisualConfig, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color: palette::BACKGROUND,
            viewport: Vec2::new(visuals.viewport_width(), visuals.viewport_height),
            scene,
        }
    }
}

/// Rendering backend capable of presenting Keyfall scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// key transitions captured by the adapter, and rewrites the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors raised while validating visual configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// A size, speed or duration must be a positive finite number.
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The note body would be drawn larger than its halo.
    InnerRadiusExceedsGlow,
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field } => write!(f, "{field} must be a positive number"),
            Self::InnerRadiusExceedsGlow => {
                write!(f, "inner_radius must not exceed glow_radius")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use keyfall_core::{HitResult, LaneSnapshot, NoteSnapshot};

    fn snapshot(state: GameState, song_time: f64, times: &[(Lane, f64)]) -> WorldSnapshot {
        let lanes = Lane::ALL
            .iter()
            .map(|&lane| LaneSnapshot {
                lane,
                notes: times
                    .iter()
                    .filter(|(note_lane, _)| *note_lane == lane)
                    .enumerate()
                    .map(|(index, (_, time))| NoteSnapshot {
                        id: NoteId::new(lane, index as u32),
                        time: *time,
                        duration: 0.1,
                        status: NoteStatus::Active,
                        grade: None,
                    })
                    .collect(),
            })
            .collect();

        WorldSnapshot {
            state,
            song_time,
            score: 0,
            combo: 0,
            max_combo: 0,
            hit_counts: HitCounts::default(),
            last_hit: None,
            countdown_remaining: None,
            lanes,
        }
    }

    #[test]
    fn default_visuals_are_valid() {
        assert_eq!(VisualConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validation_names_the_offending_field() {
        let visuals = VisualConfig {
            scroll_speed: 0.0,
            ..VisualConfig::default()
        };

        assert_eq!(
            visuals.validate(),
            Err(RenderingError::NonPositive {
                field: "scroll_speed"
            })
        );
    }

    #[test]
    fn lanes_are_spaced_from_the_first_lane() {
        let visuals = VisualConfig::default();

        assert_eq!(visuals.lane_x(Lane::D), 260.0);
        assert_eq!(visuals.lane_x(Lane::K), 500.0);
        assert_eq!(visuals.viewport_width(), 760.0);
    }

    #[test]
    fn note_reaches_the_hit_zone_at_its_time() {
        let visuals = VisualConfig::default();

        assert_eq!(visuals.note_y(2.0, 2.0), 680.0);
        assert_eq!(visuals.note_y(3.0, 2.0), 380.0);
        assert_eq!(visuals.note_y(2.0, 2.5), 830.0);
    }

    #[test]
    fn notes_outside_the_viewport_are_culled() {
        let visuals = VisualConfig::default();
        // at song time 0: y = 680 - t * 300
        let snapshot = snapshot(
            GameState::Playing,
            0.0,
            &[
                (Lane::D, -0.5),
                (Lane::D, 1.0),
                (Lane::D, 2.5),
                (Lane::D, 3.0),
                (Lane::F, 0.5),
            ],
        );

        let scene = Scene::gameplay(&snapshot, [false; LANE_COUNT], &visuals, "demo");
        let ids: Vec<NoteId> = scene.notes.iter().map(|note| note.id).collect();

        assert_eq!(
            ids,
            vec![NoteId::new(Lane::D, 1), NoteId::new(Lane::F, 0)],
            "below-viewport notes are skipped and scanning stops above it"
        );
        assert_eq!(scene.notes[0].center, Vec2::new(260.0, 380.0));
    }

    #[test]
    fn resolved_notes_are_not_drawn() {
        let visuals = VisualConfig::default();
        let mut snapshot = snapshot(GameState::Playing, 0.0, &[(Lane::J, 1.0)]);
        snapshot.lanes[Lane::J.index()].notes[0].status = NoteStatus::Hit;

        let scene = Scene::gameplay(&snapshot, [false; LANE_COUNT], &visuals, "demo");

        assert!(scene.notes.is_empty());
    }

    #[test]
    fn pressed_lane_highlights_its_hit_zone() {
        let visuals = VisualConfig::default();
        let snapshot = snapshot(GameState::Playing, 0.0, &[]);

        let scene = Scene::gameplay(&snapshot, [false, true, false, false], &visuals, "demo");

        assert_eq!(scene.lanes[1].hit_zone_color(), palette::HIT_ZONE_PRESSED);
        assert_eq!(scene.lanes[0].hit_zone_color(), palette::HIT_ZONE);
        assert_eq!(scene.lanes[1].hit_zone_origin, Vec2::new(308.0, 680.0));
    }

    #[test]
    fn hit_feedback_fades_over_its_duration() {
        let visuals = VisualConfig {
            hit_feedback_duration: 0.5,
            ..VisualConfig::default()
        };
        let mut snapshot = snapshot(GameState::Playing, 1.25, &[]);
        snapshot.last_hit = Some(HitResult {
            grade: Grade::Great,
            time: 1.0,
        });

        let scene = Scene::gameplay(&snapshot, [false; LANE_COUNT], &visuals, "demo");
        let feedback = scene
            .hud
            .and_then(|hud| hud.feedback)
            .expect("feedback visible");
        assert_eq!(feedback.grade, Grade::Great);
        assert_eq!(feedback.alpha, 0.5);

        snapshot.song_time = 1.5;
        let scene = Scene::gameplay(&snapshot, [false; LANE_COUNT], &visuals, "demo");
        assert_eq!(scene.hud.and_then(|hud| hud.feedback), None);
    }

    #[test]
    fn overlay_follows_the_lifecycle_state() {
        let visuals = VisualConfig::default();
        let scene_for = |snapshot: &WorldSnapshot| {
            Scene::gameplay(snapshot, [false; LANE_COUNT], &visuals, "demo").overlay
        };

        assert_eq!(
            scene_for(&snapshot(GameState::Start, 0.0, &[])),
            Some(Overlay::Start)
        );
        assert_eq!(scene_for(&snapshot(GameState::Playing, 0.0, &[])), None);

        let mut counting = snapshot(GameState::Countdown, 0.0, &[]);
        counting.countdown_remaining = Some(Duration::from_millis(1_500));
        assert_eq!(
            scene_for(&counting),
            Some(Overlay::Countdown { seconds: 2 })
        );
        counting.countdown_remaining = Some(Duration::from_secs(3));
        assert_eq!(
            scene_for(&counting),
            Some(Overlay::Countdown { seconds: 3 })
        );
    }

    #[test]
    fn game_over_overlay_lists_the_summary() {
        let mut counts = HitCounts::default();
        counts.record(Grade::Perfect);
        counts.record(Grade::Good);
        counts.record_miss();
        let overlay = Overlay::GameOver {
            score: 400,
            max_combo: 2,
            hit_counts: counts,
        };

        let lines = overlay.lines();

        assert!(lines.contains(&"Score 400".to_owned()));
        assert!(lines.contains(&"Max combo 2".to_owned()));
        assert!(lines.contains(&"Miss 1".to_owned()));
    }

    #[test]
    fn menu_cards_stack_and_highlight_the_selection() {
        let song = |name: &str| SongEntry {
            name: name.to_owned(),
            bpm: 120.0,
            duration: 60.0,
            total_notes: 90,
            difficulty: keyfall_core::Difficulty::Chill,
            fingerprint: keyfall_core::ChartFingerprint::new(7),
        };

        let scene = Scene::song_select(&[song("one"), song("two")], 1);

        assert_eq!(scene.menu.len(), 2);
        assert!(!scene.menu[0].highlighted);
        assert!(scene.menu[1].highlighted);
        assert!(scene.menu[1].top > scene.menu[0].top);
        assert_eq!(scene.menu[0].detail, "120 BPM  Chill  90 notes");
        assert!(scene.hud.is_none());
    }

    #[test]
    fn hex_colors_unpack_channels() {
        let color = Color::from_hex(0xff_00_80);

        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.0);
        assert_eq!(color.blue, 128.0 / 255.0);
        assert_eq!(color.with_alpha(0.5).alpha, 0.5);
    }
}
