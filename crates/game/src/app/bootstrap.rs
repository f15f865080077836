use engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, StartupError, TilesetConfig};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, ConfigError, GameConfig};
use crate::scene::DungeonScene;
use crate::tiles::fallback_palette;

const TILESET_RELATIVE_PATH: &str = "tilesets/tileset.png";
const TILESET_MARGIN_PX: u32 = 1;
const TILESET_SPACING_PX: u32 = 2;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Delve Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), assets = %paths.assets_dir.display(), "paths_resolved");
    let game_config = load_config(&paths.assets_dir)?;
    info!(
        width = game_config.dungeon.width,
        height = game_config.dungeon.height,
        seed = ?game_config.seed,
        "game_config_ready"
    );

    let config = loop_config(&paths, &game_config);
    Ok(AppWiring {
        config,
        scene: Box::new(DungeonScene::new(game_config)),
    })
}

fn loop_config(paths: &AppPaths, game_config: &GameConfig) -> LoopConfig {
    LoopConfig {
        tileset: Some(TilesetConfig {
            path: paths.assets_dir.join(TILESET_RELATIVE_PATH),
            tile_size_px: game_config.tile_size_px,
            margin_px: TILESET_MARGIN_PX,
            spacing_px: TILESET_SPACING_PX,
        }),
        palette: fallback_palette(&game_config.theme),
        ..LoopConfig::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
