use std::time::Duration;

use engine::{TileGrid, Vec2};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::decorate::{paint_ground, place_props, GroundReport, PropError, PropKind, PropReport};
use crate::dungeon::{generate, Dungeon, LayoutError, RoomId};
use crate::progression::{LevelProgression, ProgressionEvent};
use crate::tiles::STAIRS;
use crate::visibility::RoomVisibility;

/// Counters that outlive a single level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSession {
    level_number: u32,
    has_reached_stairs: bool,
}

impl Default for LevelSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelSession {
    pub fn new() -> Self {
        Self {
            level_number: 1,
            has_reached_stairs: false,
        }
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn has_reached_stairs(&self) -> bool {
        self.has_reached_stairs
    }

    pub fn with_stairs_reached(self) -> Self {
        Self {
            has_reached_stairs: true,
            ..self
        }
    }

    /// Session for the next level.
    pub fn advance(self) -> Self {
        Self {
            level_number: self.level_number.saturating_add(1),
            has_reached_stairs: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to lay out dungeon: {0}")]
    Layout(#[from] LayoutError),
    #[error("failed to place props: {0}")]
    Props(#[from] PropError),
    #[error("dungeon has no area ({width}x{height})")]
    EmptyDungeon { width: i32, height: i32 },
}

/// Everything one level owns besides the tile grid.
#[derive(Debug, Clone)]
pub struct Level {
    dungeon: Dungeon,
    visibility: RoomVisibility,
    progression: LevelProgression,
    ground: GroundReport,
    props: PropReport,
}

#[derive(Debug, Clone)]
pub struct BuiltLevel {
    pub grid: TileGrid,
    pub level: Level,
}

pub fn build_level<R: Rng + ?Sized>(
    config: &GameConfig,
    session: LevelSession,
    rng: &mut R,
) -> Result<BuiltLevel, LevelError> {
    let dungeon = generate(&config.dungeon, rng)?;
    build_level_from_dungeon(dungeon, config, session, rng)
}

/// Paints, decorates and fogs a level for an already laid out dungeon.
pub fn build_level_from_dungeon<R: Rng + ?Sized>(
    dungeon: Dungeon,
    config: &GameConfig,
    session: LevelSession,
    rng: &mut R,
) -> Result<BuiltLevel, LevelError> {
    if dungeon.width() <= 0 || dungeon.height() <= 0 {
        return Err(LevelError::EmptyDungeon {
            width: dungeon.width(),
            height: dungeon.height(),
        });
    }
    let mut grid = TileGrid::new(
        dungeon.width() as u32,
        dungeon.height() as u32,
        config.tile_size_px,
    );

    let ground = paint_ground(&dungeon, &config.theme, &mut grid, rng);
    let props = place_props(&dungeon, &config.theme, &mut grid.stuff, rng)?;
    let visibility = RoomVisibility::new(&dungeon, &mut grid.shadow);
    let progression = LevelProgression::new(config.fade_duration(), &mut grid.stuff);

    let level = Level {
        dungeon,
        visibility,
        progression,
        ground,
        props,
    };
    info!(
        level = session.level_number(),
        rooms = level.dungeon.room_count(),
        doors = level.ground.doors_painted,
        decorated = level.props.partition.decorated.len(),
        chests = level.props.count(PropKind::Chest),
        pots = level.props.count(PropKind::Pot),
        towers = level.props.count(PropKind::Towers),
        end_room = level.end_room().0,
        stairs = grid.stuff.count_tiles(STAIRS),
        armed_triggers = grid.stuff.triggers().armed_count(),
        "level_built"
    );
    debug!(level = session.level_number(), "\n{}", level.dungeon.draw_to_string());

    Ok(BuiltLevel { grid, level })
}

impl Level {
    #[cfg(test)]
    pub(crate) fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    #[cfg(test)]
    pub(crate) fn visibility(&self) -> &RoomVisibility {
        &self.visibility
    }

    pub fn ground_report(&self) -> &GroundReport {
        &self.ground
    }

    pub fn prop_report(&self) -> &PropReport {
        &self.props
    }

    pub fn start_room(&self) -> RoomId {
        self.props.partition.start
    }

    pub fn end_room(&self) -> RoomId {
        self.props.partition.end
    }

    /// World position at the centre of the start room.
    pub fn player_spawn(&self, grid: &TileGrid) -> Vec2 {
        let (x, y) = self
            .dungeon
            .room(self.start_room())
            .map(|room| room.center())
            .unwrap_or((0, 0));
        grid.tile_center_world(x, y)
    }

    pub fn fade_level(&self) -> f32 {
        self.progression.fade_level()
    }

    /// One frame: fog follows the player's room, and the stairs trigger and
    /// fade timer advance. Returns the session to carry into the next frame.
    pub fn update(
        &mut self,
        grid: &mut TileGrid,
        session: LevelSession,
        player_world: Vec2,
        dt: Duration,
    ) -> (LevelSession, ProgressionEvent) {
        let (tile_x, tile_y) = grid.world_to_tile(player_world);

        if !session.has_reached_stairs() {
            let room = self.dungeon.get_room_at(tile_x, tile_y);
            if self
                .visibility
                .set_active_room(room, &self.dungeon, &mut grid.shadow)
            {
                debug!(
                    room = ?room,
                    tile_x,
                    tile_y,
                    visited = self.visibility.visited_count(),
                    repaints = self.visibility.repaint_count(),
                    "player_room_changed"
                );
            }
        }

        let event = self.progression.update(&mut grid.stuff, (tile_x, tile_y), dt);
        let session = match event {
            ProgressionEvent::None => session,
            ProgressionEvent::StairsReached => {
                info!(level = session.level_number(), "stairs_reached");
                session.with_stairs_reached()
            }
            ProgressionEvent::RebuildRequested => {
                let next = session.advance();
                info!(
                    from_level = session.level_number(),
                    to_level = next.level_number(),
                    "level_rebuild_requested"
                );
                next
            }
        };
        (session, event)
    }

    #[cfg(test)]
    pub(crate) fn is_transitioning(&self) -> bool {
        self.progression.state() == crate::progression::ProgressionState::Transitioning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{DoorLocation, Room};
    use crate::tiles::{CHEST, POTS, TOWER_TOP};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const STEP: Duration = Duration::from_millis(1000 / 60);

    fn five_rooms() -> Dungeon {
        let rooms = (0..5)
            .map(|index| {
                let room = Room::new(index * 9, 0, 9, 9);
                let mut doors = Vec::new();
                if index > 0 {
                    doors.push(DoorLocation::new(0, 4));
                }
                if index < 4 {
                    doors.push(DoorLocation::new(8, 4));
                }
                room.with_doors(doors)
            })
            .collect();
        Dungeon::new(45, 9, rooms)
    }

    fn built(seed: u64) -> BuiltLevel {
        let mut rng = StdRng::seed_from_u64(seed);
        build_level_from_dungeon(five_rooms(), &GameConfig::default(), LevelSession::new(), &mut rng)
            .expect("level")
    }

    fn stairs_world(level: &Level, grid: &TileGrid) -> Vec2 {
        let (x, y) = level.prop_report().stairs;
        grid.tile_center_world(x, y)
    }

    #[test]
    fn session_advances_one_level_at_a_time() {
        let session = LevelSession::new();
        assert_eq!(session.level_number(), 1);
        let reached = session.with_stairs_reached();
        assert!(reached.has_reached_stairs());
        let next = reached.advance();
        assert_eq!(next.level_number(), 2);
        assert!(!next.has_reached_stairs());
    }

    #[test]
    fn five_room_level_has_one_stairs_and_a_clean_start() {
        let BuiltLevel { grid, level } = built(3);
        assert_eq!(grid.stuff.count_tiles(STAIRS), 1);
        assert_eq!(level.start_room(), RoomId(0));
        assert_ne!(level.end_room(), RoomId(0));
        assert_eq!(level.prop_report().partition.decorated.len(), 2);
        assert_eq!(level.prop_report().partition.excluded.len(), 1);

        let start = &level.dungeon().rooms()[0];
        for y in start.top()..=start.bottom() {
            for x in start.left()..=start.right() {
                let tile = grid.stuff.tile_at(x, y);
                assert!(
                    !matches!(tile, Some(t) if t == CHEST || t == STAIRS || t == TOWER_TOP || POTS.contains(&t)),
                    "prop in start room at ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn every_decorated_room_gets_exactly_one_prop_kind() {
        let BuiltLevel { level, .. } = built(11);
        let report = level.prop_report();
        let placed = report.count(PropKind::Chest)
            + report.count(PropKind::Pot)
            + report.count(PropKind::Towers);
        assert_eq!(placed, report.partition.decorated.len());
    }

    #[test]
    fn player_spawns_on_start_room_center() {
        let BuiltLevel { grid, level } = built(1);
        assert_eq!(level.player_spawn(&grid), Vec2::new(4.5, 4.5));
        assert!(!grid.blocks_movement(4, 4));
    }

    #[test]
    fn standing_in_a_room_activates_it() {
        let BuiltLevel { mut grid, mut level } = built(1);
        let spawn = level.player_spawn(&grid);
        let (session, event) = level.update(&mut grid, LevelSession::new(), spawn, STEP);
        assert_eq!(event, ProgressionEvent::None);
        assert_eq!(session, LevelSession::new());
        assert_eq!(level.visibility().active_room(), Some(RoomId(0)));
        assert_eq!(grid.shadow.alpha_at(4, 4), Some(0.0));
    }

    #[test]
    fn reaching_stairs_fades_then_advances_the_session_once() {
        let BuiltLevel { mut grid, mut level } = built(5);
        let stairs = stairs_world(&level, &grid);
        let mut session = LevelSession::new();

        let (next, event) = level.update(&mut grid, session, stairs, STEP);
        session = next;
        assert_eq!(event, ProgressionEvent::StairsReached);
        assert!(session.has_reached_stairs());
        assert!(level.is_transitioning());
        let active_at_stairs = level.visibility().active_room();

        let mut rebuilds = 0;
        for _ in 0..60 {
            let (next, event) = level.update(&mut grid, session, Vec2::new(0.5, 0.5), STEP);
            session = next;
            if event == ProgressionEvent::RebuildRequested {
                rebuilds += 1;
                assert_eq!(session.level_number(), 2);
                break;
            }
            // Fog is frozen once the stairs are reached.
            assert_eq!(level.visibility().active_room(), active_at_stairs);
        }
        assert_eq!(rebuilds, 1);
        assert_eq!(level.fade_level(), 1.0);
    }

    #[test]
    fn rebuilt_level_arms_stairs_exactly_once() {
        let config = GameConfig::default();
        let session = LevelSession::new().with_stairs_reached().advance();
        let mut rng = StdRng::seed_from_u64(2);
        let BuiltLevel { grid, level } =
            build_level(&config, session, &mut rng).expect("generated level");

        assert_eq!(session.level_number(), 2);
        assert_eq!(grid.stuff.count_tiles(STAIRS), 1);
        assert!(grid.stuff.triggers().is_armed(STAIRS));
        assert_eq!(grid.stuff.triggers().armed_count(), 1);
        assert!(!level.is_transitioning());
        assert_eq!(level.ground_report().doors_dropped, 0);
    }

    #[test]
    fn single_room_dungeon_is_fatal() {
        let mut rng = StdRng::seed_from_u64(0);
        let dungeon = Dungeon::new(9, 9, vec![Room::new(0, 0, 9, 9)]);
        let result =
            build_level_from_dungeon(dungeon, &GameConfig::default(), LevelSession::new(), &mut rng);
        assert!(matches!(
            result,
            Err(LevelError::Props(PropError::NotEnoughRooms { rooms: 1 }))
        ));
    }

    #[test]
    fn empty_dungeon_is_fatal() {
        let mut rng = StdRng::seed_from_u64(0);
        let dungeon = Dungeon::new(9, 9, Vec::new());
        let result =
            build_level_from_dungeon(dungeon, &GameConfig::default(), LevelSession::new(), &mut rng);
        assert!(matches!(
            result,
            Err(LevelError::Props(PropError::NotEnoughRooms { rooms: 0 }))
        ));
    }
}
