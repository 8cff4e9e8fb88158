#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Keyfall.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so
//! the dependency is declared without default features. The song clock comes
//! from the transport handed to the driver, never from this backend.

use anyhow::Result;
use glam::Vec2;
use keyfall_rendering::{
    palette, Color, FrameInput, Hud, MenuCard, Overlay, Presentation, RenderingBackend, Scene,
    SceneLane, SceneNote,
};
use macroquad::input::{is_key_pressed, is_key_released, KeyCode};
use std::time::Duration;

const HUD_FONT_SIZE: u16 = 28;
const FEEDBACK_FONT_SIZE: u16 = 40;
const OVERLAY_FONT_SIZE: u16 = 36;
const CARD_TITLE_FONT_SIZE: u16 = 30;
const CARD_DETAIL_FONT_SIZE: u16 = 20;
const CARD_HEIGHT: f32 = 72.0;
const CARD_MARGIN: f32 = 60.0;
const LINE_SPACING: f32 = 1.4;

/// Keys polled every frame, paired with the DOM `code` string the engine understands.
const POLLED_KEYS: &[(KeyCode, &str)] = &[
    (KeyCode::Space, "Space"),
    (KeyCode::Escape, "Escape"),
    (KeyCode::Enter, "Enter"),
    (KeyCode::KpEnter, "NumpadEnter"),
    (KeyCode::Up, "ArrowUp"),
    (KeyCode::Down, "ArrowDown"),
    (KeyCode::Left, "ArrowLeft"),
    (KeyCode::Right, "ArrowRight"),
    (KeyCode::Tab, "Tab"),
    (KeyCode::Backspace, "Backspace"),
    (KeyCode::A, "KeyA"),
    (KeyCode::B, "KeyB"),
    (KeyCode::C, "KeyC"),
    (KeyCode::D, "KeyD"),
    (KeyCode::E, "KeyE"),
    (KeyCode::F, "KeyF"),
    (KeyCode::G, "KeyG"),
    (KeyCode::H, "KeyH"),
    (KeyCode::I, "KeyI"),
    (KeyCode::J, "KeyJ"),
    (KeyCode::K, "KeyK"),
    (KeyCode::L, "KeyL"),
    (KeyCode::M, "KeyM"),
    (KeyCode::N, "KeyN"),
    (KeyCode::O, "KeyO"),
    (KeyCode::P, "KeyP"),
    (KeyCode::Q, "KeyQ"),
    (KeyCode::R, "KeyR"),
    (KeyCode::S, "KeyS"),
    (KeyCode::T, "KeyT"),
    (KeyCode::U, "KeyU"),
    (KeyCode::V, "KeyV"),
    (KeyCode::W, "KeyW"),
    (KeyCode::X, "KeyX"),
    (KeyCode::Y, "KeyY"),
    (KeyCode::Z, "KeyZ"),
];

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(i32::from(enabled));
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            viewport,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: viewport.x.round() as i32,
            window_height: viewport.y.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        log::info!(
            "opening {}x{} window",
            config.window_width,
            config.window_height
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);

            loop {
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, poll_frame_input(), &mut scene);

                macroquad::window::clear_background(background);
                let metrics = ScreenMetrics::fit(
                    viewport,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                for lane in &scene.lanes {
                    draw_lane(lane, &metrics, viewport.y);
                }
                for note in &scene.notes {
                    draw_note(note, &metrics);
                }
                if let Some(hud) = &scene.hud {
                    draw_hud(hud, &scene.lanes, &metrics);
                }
                if !scene.menu.is_empty() {
                    draw_menu(&scene.menu, &metrics, viewport.x);
                }
                if let Some(overlay) = &scene.overlay {
                    draw_overlay(overlay, &metrics, viewport);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn poll_frame_input() -> FrameInput {
    observe_keys(is_key_pressed, is_key_released)
}

fn observe_keys(
    mut pressed: impl FnMut(KeyCode) -> bool,
    mut released: impl FnMut(KeyCode) -> bool,
) -> FrameInput {
    let mut input = FrameInput::default();
    for &(key, code) in POLLED_KEYS {
        if pressed(key) {
            input.pressed.push(code.to_owned());
        }
        if released(key) {
            input.released.push(code.to_owned());
        }
    }
    input
}

/// Uniform scale and letterbox offset mapping scene pixels to the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenMetrics {
    scale: f32,
    offset: Vec2,
}

impl ScreenMetrics {
    fn fit(viewport: Vec2, screen_width: f32, screen_height: f32) -> Self {
        if viewport.x <= f32::EPSILON || viewport.y <= f32::EPSILON {
            return Self {
                scale: 1.0,
                offset: Vec2::ZERO,
            };
        }

        let scale = (screen_width / viewport.x).min(screen_height / viewport.y);
        let offset = Vec2::new(
            ((screen_width - viewport.x * scale) * 0.5).max(0.0),
            ((screen_height - viewport.y * scale) * 0.5).max(0.0),
        );
        Self { scale, offset }
    }

    fn point(&self, position: Vec2) -> Vec2 {
        self.offset + position * self.scale
    }

    fn length(&self, value: f32) -> f32 {
        value * self.scale
    }

    fn font(&self, size: u16) -> u16 {
        (f32::from(size) * self.scale).round().max(1.0) as u16
    }
}

fn draw_lane(lane: &SceneLane, metrics: &ScreenMetrics, height: f32) {
    let guide = metrics.point(Vec2::new(lane.x - lane.guide_width / 2.0, 0.0));
    macroquad::shapes::draw_rectangle(
        guide.x,
        guide.y,
        metrics.length(lane.guide_width),
        metrics.length(height),
        to_macroquad_color(palette::LANE_GUIDE),
    );

    let zone = metrics.point(lane.hit_zone_origin);
    let size = lane.hit_zone_size * metrics.scale;
    macroquad::shapes::draw_rectangle(
        zone.x,
        zone.y,
        size.x,
        size.y,
        to_macroquad_color(lane.hit_zone_color()),
    );
}

fn draw_note(note: &SceneNote, metrics: &ScreenMetrics) {
    let center = metrics.point(note.center);
    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        metrics.length(note.glow_radius),
        to_macroquad_color(palette::NOTE_GLOW),
    );
    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        metrics.length(note.inner_radius),
        to_macroquad_color(palette::NOTE_BODY),
    );
}

fn draw_hud(hud: &Hud, lanes: &[SceneLane], metrics: &ScreenMetrics) {
    let text = to_macroquad_color(palette::TEXT);
    let font = metrics.font(HUD_FONT_SIZE);
    let line = f32::from(font) * LINE_SPACING;
    let origin = metrics.point(Vec2::new(24.0, 40.0));

    macroquad::text::draw_text(&hud.title, origin.x, origin.y, f32::from(font), text);
    macroquad::text::draw_text(
        &format!("Score {}", hud.score),
        origin.x,
        origin.y + line,
        f32::from(font),
        text,
    );
    macroquad::text::draw_text(
        &format!("Combo {}", hud.combo),
        origin.x,
        origin.y + line * 2.0,
        f32::from(font),
        text,
    );

    let Some(feedback) = hud.feedback else {
        return;
    };
    let (Some(first), Some(last)) = (lanes.first(), lanes.last()) else {
        return;
    };
    let anchor = Vec2::new(
        (first.x + last.x) / 2.0,
        first.hit_zone_origin.y - 60.0,
    );
    let label = feedback.grade.to_string();
    let color = palette::TEXT.with_alpha(feedback.alpha);
    draw_centered_text(&label, metrics.point(anchor), metrics.font(FEEDBACK_FONT_SIZE), color);
}

fn draw_menu(cards: &[MenuCard], metrics: &ScreenMetrics, width: f32) {
    let heading = metrics.point(Vec2::new(width / 2.0, 80.0));
    draw_centered_text(
        "Select a song",
        heading,
        metrics.font(OVERLAY_FONT_SIZE),
        palette::TEXT,
    );

    for card in cards {
        let fill = if card.highlighted {
            palette::CARD_HIGHLIGHT
        } else {
            palette::CARD
        };
        let corner = metrics.point(Vec2::new(CARD_MARGIN, card.top));
        macroquad::shapes::draw_rectangle(
            corner.x,
            corner.y,
            metrics.length(width - CARD_MARGIN * 2.0),
            metrics.length(CARD_HEIGHT),
            to_macroquad_color(fill),
        );

        let title = metrics.point(Vec2::new(CARD_MARGIN + 16.0, card.top + 30.0));
        macroquad::text::draw_text(
            &card.title,
            title.x,
            title.y,
            f32::from(metrics.font(CARD_TITLE_FONT_SIZE)),
            to_macroquad_color(palette::TEXT),
        );
        let detail = metrics.point(Vec2::new(CARD_MARGIN + 16.0, card.top + 58.0));
        macroquad::text::draw_text(
            &card.detail,
            detail.x,
            detail.y,
            f32::from(metrics.font(CARD_DETAIL_FONT_SIZE)),
            to_macroquad_color(palette::TEXT.lighten(0.3).with_alpha(0.8)),
        );
    }
}

fn draw_overlay(overlay: &Overlay, metrics: &ScreenMetrics, viewport: Vec2) {
    let corner = metrics.point(Vec2::ZERO);
    let size = viewport * metrics.scale;
    macroquad::shapes::draw_rectangle(
        corner.x,
        corner.y,
        size.x,
        size.y,
        to_macroquad_color(palette::OVERLAY_SHADE),
    );

    let lines = overlay.lines();
    let font = metrics.font(OVERLAY_FONT_SIZE);
    let line_height = f32::from(font) * LINE_SPACING;
    let block = line_height * lines.len() as f32;
    let center = metrics.point(viewport / 2.0);
    let mut y = center.y - block / 2.0 + line_height / 2.0;
    for line in &lines {
        draw_centered_text(line, Vec2::new(center.x, y), font, palette::TEXT);
        y += line_height;
    }
}

fn draw_centered_text(text: &str, center: Vec2, font_size: u16, color: Color) {
    let dimensions = macroquad::text::measure_text(text, None, font_size, 1.0);
    macroquad::text::draw_text(
        text,
        center.x - dimensions.width / 2.0,
        center.y + dimensions.height / 2.0,
        f32::from(font_size),
        to_macroquad_color(color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
