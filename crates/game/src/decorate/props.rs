use engine::TileLayer;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::dungeon::{Dungeon, Room, RoomId};
use crate::tiles::{TileTheme, CHEST, STAIRS};

const CHEST_ROLL_MAX: f32 = 0.25;
const POT_ROLL_MAX: f32 = 0.5;
const POT_WALL_MARGIN: i32 = 2;
const TALL_ROOM_MIN_HEIGHT: i32 = 9;

/// Disjoint roles for every room of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPartition {
    pub start: RoomId,
    pub end: RoomId,
    pub decorated: Vec<RoomId>,
    pub excluded: Vec<RoomId>,
}

#[derive(Debug, Error)]
pub enum PropError {
    #[error("a level needs a start room and an end room, but the dungeon has {rooms} room(s)")]
    NotEnoughRooms { rooms: usize },
    #[error("room {room:?} is not part of the dungeon")]
    UnknownRoom { room: RoomId },
}

/// Splits the rooms into start (always the first), a random end room, a
/// shuffled 90% of the rest to decorate, and whatever is left over. The
/// dungeon itself is not touched.
pub fn partition_rooms<R: Rng + ?Sized>(
    dungeon: &Dungeon,
    rng: &mut R,
) -> Result<RoomPartition, PropError> {
    let room_count = dungeon.room_count();
    if room_count < 2 {
        return Err(PropError::NotEnoughRooms { rooms: room_count });
    }

    let mut remaining: Vec<RoomId> = dungeon.room_ids().skip(1).collect();
    let end = remaining.remove(rng.gen_range(0..remaining.len()));
    remaining.shuffle(rng);
    let decorated_count = remaining.len() * 9 / 10;
    let excluded = remaining.split_off(decorated_count);

    Ok(RoomPartition {
        start: RoomId(0),
        end,
        decorated: remaining,
        excluded,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Chest,
    Pot,
    Towers,
}

/// Maps a uniform roll in `[0, 1)` to a prop.
pub fn roll_prop(roll: f32) -> PropKind {
    if roll <= CHEST_ROLL_MAX {
        PropKind::Chest
    } else if roll <= POT_ROLL_MAX {
        PropKind::Pot
    } else {
        PropKind::Towers
    }
}

/// Random interior point two tiles clear of the walls, or the room centre on
/// an axis too narrow for that margin.
pub fn pot_position<R: Rng + ?Sized>(room: &Room, rng: &mut R) -> (i32, i32) {
    let x = clamped_pick(
        room.left() + POT_WALL_MARGIN,
        room.right() - POT_WALL_MARGIN,
        room.center_x(),
        rng,
    );
    let y = clamped_pick(
        room.top() + POT_WALL_MARGIN,
        room.bottom() - POT_WALL_MARGIN,
        room.center_y(),
        rng,
    );
    (x, y)
}

fn clamped_pick<R: Rng + ?Sized>(low: i32, high: i32, fallback: i32, rng: &mut R) -> i32 {
    if low > high {
        fallback
    } else {
        rng.gen_range(low..=high)
    }
}

/// Top cells of the tower stamps for a room.
pub fn tower_anchors(room: &Room) -> Vec<(i32, i32)> {
    let (cx, cy) = room.center();
    if room.height() >= TALL_ROOM_MIN_HEIGHT {
        vec![
            (cx - 1, cy + 1),
            (cx + 1, cy + 1),
            (cx - 1, cy - 2),
            (cx + 1, cy - 2),
        ]
    } else {
        vec![(cx - 1, cy - 1), (cx + 1, cy - 1)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropReport {
    pub partition: RoomPartition,
    pub stairs: (i32, i32),
    pub placements: Vec<(RoomId, PropKind)>,
}

impl PropReport {
    pub fn count(&self, kind: PropKind) -> usize {
        self.placements
            .iter()
            .filter(|(_, placed)| *placed == kind)
            .count()
    }
}

pub fn place_props<R: Rng + ?Sized>(
    dungeon: &Dungeon,
    theme: &TileTheme,
    stuff: &mut TileLayer,
    rng: &mut R,
) -> Result<PropReport, PropError> {
    let partition = partition_rooms(dungeon, rng)?;
    place_props_in(dungeon, partition, theme, stuff, rng)
}

/// Places stairs and props for an existing partition.
pub fn place_props_in<R: Rng + ?Sized>(
    dungeon: &Dungeon,
    partition: RoomPartition,
    theme: &TileTheme,
    stuff: &mut TileLayer,
    rng: &mut R,
) -> Result<PropReport, PropError> {
    let end_room = room_by_id(dungeon, partition.end)?;
    let stairs = end_room.center();
    stuff.put_tile_at(STAIRS, stairs.0, stairs.1);

    let mut placements = Vec::with_capacity(partition.decorated.len());
    for id in &partition.decorated {
        let room = room_by_id(dungeon, *id)?;
        let kind = roll_prop(rng.gen::<f32>());
        place_prop(room, kind, theme, stuff, rng);
        placements.push((*id, kind));
    }

    Ok(PropReport {
        partition,
        stairs,
        placements,
    })
}

pub fn place_prop<R: Rng + ?Sized>(
    room: &Room,
    kind: PropKind,
    theme: &TileTheme,
    stuff: &mut TileLayer,
    rng: &mut R,
) {
    match kind {
        PropKind::Chest => {
            let (x, y) = room.center();
            stuff.put_tile_at(CHEST, x, y);
        }
        PropKind::Pot => {
            let (x, y) = pot_position(room, rng);
            if let Some(pot) = theme.pot.sample(rng) {
                stuff.put_tile_at(pot, x, y);
            }
        }
        PropKind::Towers => {
            for (x, y) in tower_anchors(room) {
                stuff.put_tiles_at(&theme.tower, x, y);
            }
        }
    }
}

fn room_by_id(dungeon: &Dungeon, id: RoomId) -> Result<&Room, PropError> {
    dungeon.room(id).ok_or(PropError::UnknownRoom { room: id })
}
