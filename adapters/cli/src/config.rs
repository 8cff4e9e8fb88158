//! Layered game configuration read from an optional TOML file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use keyfall_core::GameplayConfig;
use keyfall_rendering::VisualConfig;
use keyfall_session::EngineConfig;
use serde::{Deserialize, Serialize};

/// Every tunable the CLI threads into the engine and the renderer.
///
/// Each table and each field is optional; anything left out keeps its default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub(crate) engine: EngineConfig,
    pub(crate) gameplay: GameplayConfig,
    pub(crate) visuals: VisualConfig,
}

impl GameConfig {
    /// Reads the configuration file, or returns defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("malformed TOML")?;
        config
            .gameplay
            .validate()
            .context("invalid [gameplay] table")?;
        config.visuals.validate().context("invalid [visuals] table")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = GameConfig::parse("").expect("empty config is valid");

        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_tables_override_only_named_fields() {
        let config = GameConfig::parse(
            r#"
            [engine]
            tick_rate_ms = 8

            [gameplay]
            good_window = 0.2
            countdown_seconds = 0.0

            [visuals]
            scroll_speed = 450.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.engine.tick_rate_ms, 8);
        assert_eq!(config.engine.max_accumulator_ms, 1_000);
        assert_eq!(config.gameplay.good_window, 0.2);
        assert_eq!(config.gameplay.perfect_window, 0.05);
        assert_eq!(config.gameplay.countdown_seconds, 0.0);
        assert_eq!(config.visuals.scroll_speed, 450.0);
        assert_eq!(config.visuals.hit_zone_y, 680.0);
    }

    #[test]
    fn unordered_windows_are_rejected() {
        let error = GameConfig::parse(
            r#"
            [gameplay]
            perfect_window = 0.3
            "#,
        )
        .expect_err("perfect window wider than great must fail");

        assert!(format!("{error:#}").contains("[gameplay]"));
    }

    #[test]
    fn invalid_visuals_are_rejected() {
        let error = GameConfig::parse(
            r#"
            [visuals]
            viewport_height = -1.0
            "#,
        )
        .expect_err("negative viewport must fail");

        assert!(format!("{error:#}").contains("viewport_height"));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("/definitely/not/here/keyfall.toml");

        let error = GameConfig::load(Some(path)).expect_err("missing file must fail");

        assert!(format!("{error:#}").contains("keyfall.toml"));
    }
}
