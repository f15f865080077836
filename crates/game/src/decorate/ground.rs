use engine::{TileGrid, TileLayer};
use rand::Rng;
use tracing::warn;

use crate::dungeon::{DoorLocation, DoorSide, Dungeon, Room};
use crate::tiles::{
    TileTheme, BLANK, WALL_BOTTOM_LEFT, WALL_BOTTOM_RIGHT, WALL_TOP_LEFT, WALL_TOP_RIGHT,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroundReport {
    pub rooms_painted: usize,
    pub doors_painted: usize,
    pub doors_dropped: usize,
}

/// Which edge a room-relative door descriptor lies on. Checked top, bottom,
/// left, right in that order; anything off the perimeter is `None`.
pub fn classify_door(room: &Room, door: DoorLocation) -> Option<DoorSide> {
    if door.y == 0 {
        Some(DoorSide::Top)
    } else if door.y == room.height() - 1 {
        Some(DoorSide::Bottom)
    } else if door.x == 0 {
        Some(DoorSide::Left)
    } else if door.x == room.width() - 1 {
        Some(DoorSide::Right)
    } else {
        None
    }
}

/// World tile where the door stamp's top-left cell is written.
pub fn door_anchor(room: &Room, door: DoorLocation, side: DoorSide) -> (i32, i32) {
    let x = room.x() + door.x;
    let y = room.y() + door.y;
    match side {
        DoorSide::Top => (x - 1, y),
        DoorSide::Bottom => (x, y),
        DoorSide::Left | DoorSide::Right => (x, y - 1),
    }
}

/// Paints floor, walls, corners and doors for every room onto the ground
/// layer, then configures collision on the ground and stuff layers.
pub fn paint_ground<R: Rng + ?Sized>(
    dungeon: &Dungeon,
    theme: &TileTheme,
    grid: &mut TileGrid,
    rng: &mut R,
) -> GroundReport {
    let mut report = GroundReport::default();
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    grid.ground.fill(BLANK, 0, 0, width, height);

    for (index, room) in dungeon.rooms().iter().enumerate() {
        paint_room_shell(&mut grid.ground, room, theme, rng);
        report.rooms_painted += 1;

        for door in room.doors() {
            let Some(side) = classify_door(room, *door) else {
                warn!(
                    room = index,
                    door_x = door.x,
                    door_y = door.y,
                    room_width = room.width(),
                    room_height = room.height(),
                    "door_descriptor_dropped"
                );
                report.doors_dropped += 1;
                continue;
            };
            let (x, y) = door_anchor(room, *door, side);
            grid.ground.put_tiles_at(theme.door_stamp(side), x, y);
            report.doors_painted += 1;
        }
    }

    let passable = theme.passable_tiles();
    grid.ground.set_collision_by_exclusion(passable.iter().copied());
    grid.stuff.set_collision_by_exclusion(passable);
    report
}

fn paint_room_shell<R: Rng + ?Sized>(
    ground: &mut TileLayer,
    room: &Room,
    theme: &TileTheme,
    rng: &mut R,
) {
    let (x, y, w, h) = (room.x(), room.y(), room.width(), room.height());

    ground.weighted_randomize(x + 1, y + 1, w - 2, h - 2, &theme.floor, rng);

    ground.weighted_randomize(x + 1, room.top(), w - 2, 1, &theme.wall_top, rng);
    ground.weighted_randomize(x + 1, room.bottom(), w - 2, 1, &theme.wall_bottom, rng);
    ground.weighted_randomize(room.left(), y + 1, 1, h - 2, &theme.wall_left, rng);
    ground.weighted_randomize(room.right(), y + 1, 1, h - 2, &theme.wall_right, rng);

    ground.put_tile_at(WALL_TOP_LEFT, room.left(), room.top());
    ground.put_tile_at(WALL_TOP_RIGHT, room.right(), room.top());
    ground.put_tile_at(WALL_BOTTOM_LEFT, room.left(), room.bottom());
    ground.put_tile_at(WALL_BOTTOM_RIGHT, room.right(), room.bottom());
}
