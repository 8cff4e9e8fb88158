use std::time::Duration;

use keyfall_core::{ConfigError, GameState, GameplayConfig, Key, SongEntry, Transport};
use keyfall_system_chart::PreparedChart;
use keyfall_system_song_select::SongSelect;
use keyfall_world::{query, RhythmWorld};

use crate::{InputLayer, Session};

#[derive(Debug)]
enum Scene<T: Transport> {
    Menu(T),
    Rhythm {
        song: usize,
        session: Box<Session<T>>,
    },
}

/// Top-level application switching between the song menu and gameplay.
#[derive(Debug)]
pub struct App<T: Transport> {
    library: Vec<PreparedChart>,
    config: GameplayConfig,
    menu: SongSelect,
    input: InputLayer,
    scene: Option<Scene<T>>,
}

impl<T: Transport> App<T> {
    /// Creates an application showing the song menu.
    #[must_use]
    pub fn new(library: Vec<PreparedChart>, config: GameplayConfig, transport: T) -> Self {
        Self {
            library,
            config,
            menu: SongSelect::new(),
            input: InputLayer::new(),
            scene: Some(Scene::Menu(transport)),
        }
    }

    /// Runs one simulation tick of the active scene.
    pub fn update(&mut self, dt: Duration) {
        if let Some(Scene::Rhythm { session, .. }) = &mut self.scene {
            session.update(dt);
        }
        self.leave_finished_session();
    }

    /// Routes a key-down to the active scene, dropping auto-repeats.
    pub fn on_key_down(&mut self, code: &str) {
        if !self.input.press(code) {
            return;
        }

        if matches!(self.scene, Some(Scene::Menu(_))) {
            let key = Key::from_code(code);
            if let Some(index) = self.menu.handle_key(key, self.library.len()) {
                self.start(index);
            }
            return;
        }

        if let Some(Scene::Rhythm { session, .. }) = &mut self.scene {
            session.on_key_down(code);
        }
        self.leave_finished_session();
    }

    /// Routes a key-up to the active scene.
    pub fn on_key_up(&mut self, code: &str) {
        let _ = self.input.release(code);
        if let Some(Scene::Rhythm { session, .. }) = &mut self.scene {
            session.on_key_up(code);
        }
    }

    /// Lifecycle state of the active scene.
    #[must_use]
    pub fn state(&self) -> GameState {
        match &self.scene {
            Some(Scene::Rhythm { session, .. }) => query::state(session.world()),
            Some(Scene::Menu(_)) | None => GameState::SongSelect,
        }
    }

    /// Songs offered on the menu.
    #[must_use]
    pub fn library(&self) -> &[PreparedChart] {
        &self.library
    }

    /// Menu state.
    #[must_use]
    pub fn menu(&self) -> &SongSelect {
        &self.menu
    }

    /// Active gameplay session, if a song is being played.
    #[must_use]
    pub fn session(&self) -> Option<&Session<T>> {
        match &self.scene {
            Some(Scene::Rhythm { session, .. }) => Some(session.as_ref()),
            _ => None,
        }
    }

    /// Mutable access to the active gameplay session.
    pub fn session_mut(&mut self) -> Option<&mut Session<T>> {
        match &mut self.scene {
            Some(Scene::Rhythm { session, .. }) => Some(session.as_mut()),
            _ => None,
        }
    }

    /// Summary of the song being played.
    #[must_use]
    pub fn current_song(&self) -> Option<&SongEntry> {
        match &self.scene {
            Some(Scene::Rhythm { song, .. }) => self.library.get(*song).map(|chart| &chart.entry),
            _ => None,
        }
    }

    /// Changes the gameplay configuration for the running and all later attempts.
    pub fn configure(&mut self, config: GameplayConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(session) = self.session_mut() {
            session.configure(config.clone())?;
        }
        self.config = config;
        Ok(())
    }

    /// Tears down the active scene.
    pub fn destroy(&mut self) {
        if let Some(Scene::Rhythm { session, .. }) = &mut self.scene {
            session.destroy();
        }
        self.input.clear();
    }

    fn start(&mut self, index: usize) {
        if !matches!(self.scene, Some(Scene::Menu(_))) {
            return;
        }
        let Some(chart) = self.library.get(index) else {
            return;
        };
        let Some(Scene::Menu(transport)) = self.scene.take() else {
            return;
        };

        match RhythmWorld::new(&chart.notes, self.config.clone()) {
            Ok(world) => {
                log::info!(
                    "starting '{}' ({}, {} notes)",
                    chart.entry.name,
                    chart.entry.difficulty,
                    chart.entry.total_notes
                );
                self.scene = Some(Scene::Rhythm {
                    song: index,
                    session: Box::new(Session::with_world(world, transport)),
                });
            }
            Err(error) => {
                log::error!("cannot start '{}': {error}", chart.entry.name);
                self.scene = Some(Scene::Menu(transport));
            }
        }
    }

    fn leave_finished_session(&mut self) {
        let leaving = matches!(
            &self.scene,
            Some(Scene::Rhythm { session, .. })
                if query::state(session.world()) == GameState::SongSelect
        );
        if !leaving {
            return;
        }
        if let Some(Scene::Rhythm { session, .. }) = self.scene.take() {
            log::info!("returning to song select");
            self.scene = Some(Scene::Menu(session.into_transport()));
        }
    }
}
