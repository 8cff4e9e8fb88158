//! Windowed play through the macroquad backend.

use anyhow::{ensure, Result};
use keyfall_core::{Lane, SongEntry, LANE_COUNT};
use keyfall_rendering::{Presentation, RenderingBackend, Scene, VisualConfig};
use keyfall_rendering_macroquad::MacroquadBackend;
use keyfall_session::{App, FixedStep, WallClockTransport};
use keyfall_system_chart::PreparedChart;

use crate::config::GameConfig;

/// Opens the game window on the song menu and runs until the window closes.
pub(crate) fn run(library: Vec<PreparedChart>, config: GameConfig, vsync: bool) -> Result<()> {
    ensure!(!library.is_empty(), "no playable charts were loaded");

    let GameConfig {
        engine,
        gameplay,
        visuals,
    } = config;
    let songs: Vec<SongEntry> = library.iter().map(|chart| chart.entry.clone()).collect();
    let presentation = Presentation::new("Keyfall", &visuals, Scene::song_select(&songs, 0));

    let mut app = App::new(library, gameplay, WallClockTransport::new());
    let mut step = FixedStep::new(&engine);

    MacroquadBackend::new()
        .with_vsync(vsync)
        .run(presentation, move |frame, input, scene| {
            for code in &input.pressed {
                app.on_key_down(code);
            }
            for code in &input.released {
                app.on_key_up(code);
            }
            for _ in 0..step.advance(frame) {
                app.update(step.tick());
            }
            *scene = describe(&app, &songs, &visuals);
        })
}

fn describe(app: &App<WallClockTransport>, songs: &[SongEntry], visuals: &VisualConfig) -> Scene {
    let Some(session) = app.session() else {
        return Scene::song_select(songs, app.menu().highlight());
    };

    let mut pressed = [false; LANE_COUNT];
    for lane in Lane::ALL {
        pressed[lane.index()] = session.lane_pressed(lane);
    }
    let title = app
        .current_song()
        .map_or("", |song| song.name.as_str());
    Scene::gameplay(&session.snapshot(), pressed, visuals, title)
}
