use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::dungeon::DungeonConfig;
use crate::tiles::TileTheme;

pub const CONFIG_FILE_NAME: &str = "dungeon.json";
pub const SEED_ENV_VAR: &str = "DELVE_SEED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub dungeon: DungeonConfig,
    pub theme: TileTheme,
    pub fade_duration_ms: u64,
    pub tile_size_px: u32,
    /// Tiles per second.
    pub player_speed: f32,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dungeon: DungeonConfig::default(),
            theme: TileTheme::default(),
            fade_duration_ms: 250,
            tile_size_px: 48,
            player_speed: 6.0,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{var} must be an unsigned integer, got {value:?}")]
    InvalidSeed { var: &'static str, value: String },
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
}

/// Reads `<assets_dir>/dungeon.json`, falling back to defaults when the file
/// is absent, then applies the seed override from the environment.
pub fn load_config(assets_dir: &Path) -> Result<GameConfig, ConfigError> {
    let path = assets_dir.join(CONFIG_FILE_NAME);
    let mut config = if path.is_file() {
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = parse_config(&raw, &path)?;
        info!(path = %path.display(), "config_loaded");
        config
    } else {
        info!(path = %path.display(), "config_missing_using_defaults");
        GameConfig::default()
    };

    if let Some(seed) = seed_override(read_seed_env()?)? {
        info!(seed, var = SEED_ENV_VAR, "seed_overridden");
        config.seed = Some(seed);
    }
    Ok(config)
}

pub fn parse_config(raw: &str, path: &Path) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

fn read_seed_env() -> Result<Option<String>, ConfigError> {
    match env::var(SEED_ENV_VAR) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(ConfigError::EnvVar {
            var: SEED_ENV_VAR,
            source,
        }),
    }
}

fn seed_override(raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidSeed {
            var: SEED_ENV_VAR,
            value: raw.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = parse_config("{}", Path::new("dungeon.json")).expect("config");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.fade_duration(), Duration::from_millis(250));
        assert_eq!(config.dungeon.width, 50);
        assert_eq!(config.dungeon.rooms.width.min, 7);
        assert!(config.dungeon.rooms.height.only_odd);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let raw = r#"{ "dungeon": { "width": 80, "rooms": { "height": { "max": 15 } } }, "seed": 9 }"#;
        let config = parse_config(raw, Path::new("dungeon.json")).expect("config");
        assert_eq!(config.dungeon.width, 80);
        assert_eq!(config.dungeon.height, 50);
        assert_eq!(config.dungeon.rooms.height.max, 15);
        assert_eq!(config.dungeon.rooms.height.min, 7);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn parse_error_names_the_json_path() {
        let raw = r#"{ "dungeon": { "rooms": { "width": { "min": "seven" } } } }"#;
        let error = parse_config(raw, Path::new("dungeon.json")).expect_err("bad type");
        match error {
            ConfigError::Parse { json_path, .. } => {
                assert_eq!(json_path, "dungeon.rooms.width.min");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(dir.path()).expect("config");
        assert_eq!(config.dungeon, DungeonConfig::default());
    }

    #[test]
    fn file_on_disk_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "fade_duration_ms": 500, "tile_size_px": 32 }"#,
        )
        .expect("write");
        let config = load_config(dir.path()).expect("config");
        assert_eq!(config.fade_duration_ms, 500);
        assert_eq!(config.tile_size_px, 32);
    }

    #[test]
    fn seed_override_parsing() {
        assert_eq!(seed_override(None).expect("none"), None);
        assert_eq!(seed_override(Some("  ".into())).expect("blank"), None);
        assert_eq!(seed_override(Some(" 42 ".into())).expect("seed"), Some(42));
        assert!(matches!(
            seed_override(Some("abc".into())),
            Err(ConfigError::InvalidSeed { .. })
        ));
    }
}
