use std::time::Duration;

use engine::{InputSnapshot, Scene, SceneCommand, SceneLoadError, SceneWorld, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::GameConfig;
use crate::level::{build_level, BuiltLevel, Level, LevelSession};
use crate::player::Player;
use crate::progression::ProgressionEvent;

const SCENE_NAME: &str = "dungeon";

pub fn level_title(level_number: u32) -> String {
    format!("Look for some stairs. Keep going... Current level: {level_number}")
}

/// Seeded runs get a distinct, reproducible stream per level.
pub fn level_rng(seed: Option<u64>, level_number: u32) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(level_number))),
        None => StdRng::from_entropy(),
    }
}

struct ActiveLevel {
    level: Level,
    player: Option<Player>,
}

/// Runs one level at a time and asks the runtime for a hard reset when the
/// player has taken the stairs.
pub struct DungeonScene {
    config: GameConfig,
    session: LevelSession,
    active: Option<ActiveLevel>,
}

impl DungeonScene {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            session: LevelSession::new(),
            active: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> LevelSession {
        self.session
    }

    #[cfg(test)]
    pub(crate) fn level(&self) -> Option<&Level> {
        self.active.as_ref().map(|active| &active.level)
    }

    #[cfg(test)]
    pub(crate) fn player(&self) -> Option<&Player> {
        self.active.as_ref().and_then(|active| active.player.as_ref())
    }
}

impl Scene for DungeonScene {
    fn name(&self) -> &'static str {
        SCENE_NAME
    }

    fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneLoadError> {
        let level_number = self.session.level_number();
        let mut rng = level_rng(self.config.seed, level_number);
        let BuiltLevel { grid, level } = build_level(&self.config, self.session, &mut rng)
            .map_err(|error| SceneLoadError::new(SCENE_NAME, error))?;

        let spawn = level.player_spawn(&grid);
        let bounds = Vec2::new(grid.width() as f32, grid.height() as f32);
        world.set_tile_grid(grid);
        world.set_fade(0.0);
        world.set_title(level_title(level_number));
        let view = world.view_size();
        world.camera_mut().follow_within(spawn, view, bounds);

        let player = Player::spawn(world, spawn, self.config.player_speed);
        let (stairs_x, stairs_y) = level.prop_report().stairs;
        info!(
            level = level_number,
            x = spawn.x,
            y = spawn.y,
            stairs_x,
            stairs_y,
            doors_dropped = level.ground_report().doors_dropped,
            "player_spawned"
        );
        self.active = Some(ActiveLevel {
            level,
            player: Some(player),
        });
        Ok(())
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(active) = self.active.as_mut() else {
            return SceneCommand::None;
        };
        if let Some(player) = active.player.as_mut() {
            player.update(world, input, fixed_dt_seconds);
        }
        let Some(position) = active.player.as_ref().and_then(|player| player.position(world)) else {
            return SceneCommand::None;
        };
        let Some(grid) = world.tile_grid_mut() else {
            return SceneCommand::None;
        };
        let bounds = Vec2::new(grid.width() as f32, grid.height() as f32);

        let dt = Duration::from_secs_f32(fixed_dt_seconds.max(0.0));
        let (session, event) = active.level.update(grid, self.session, position, dt);
        self.session = session;
        world.set_fade(active.level.fade_level());

        match event {
            ProgressionEvent::None => {}
            ProgressionEvent::StairsReached => {
                if let Some(player) = active.player.as_mut() {
                    player.freeze();
                }
            }
            ProgressionEvent::RebuildRequested => {
                if let Some(player) = active.player.take() {
                    player.destroy(world);
                }
                return SceneCommand::Rebuild;
            }
        }

        let view = world.view_size();
        world.camera_mut().follow_within(position, view, bounds);
        SceneCommand::None
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        if let Some(active) = self.active.take() {
            if let Some(player) = active.player {
                player.destroy(world);
            }
        }
        world.take_tile_grid();
    }
}
