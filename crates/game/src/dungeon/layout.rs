use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DoorLocation, DoorSide, Dungeon, Room};

/// Narrowest gap kept between a door and the room's corner. Door stamps are
/// three tiles wide, so anything closer would overwrite a corner.
const MIN_DOOR_CORNER_GAP: i32 = 2;
/// Doors on the same wall keep this far apart so their stamps never overlap.
const MIN_DOOR_SPACING: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionRange {
    pub min: i32,
    pub max: i32,
    pub only_odd: bool,
}

impl Default for DimensionRange {
    fn default() -> Self {
        Self {
            min: 7,
            max: 21,
            only_odd: true,
        }
    }
}

impl DimensionRange {
    fn first_allowed(&self) -> i32 {
        if self.only_odd && self.min % 2 == 0 {
            self.min + 1
        } else {
            self.min
        }
    }

    fn last_allowed(&self) -> i32 {
        if self.only_odd && self.max % 2 == 0 {
            self.max - 1
        } else {
            self.max
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let first = self.first_allowed();
        let last = self.last_allowed();
        if last <= first {
            return first;
        }
        if self.only_odd {
            first + 2 * rng.gen_range(0..=(last - first) / 2)
        } else {
            rng.gen_range(first..=last)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSizeConfig {
    pub width: DimensionRange,
    pub height: DimensionRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub width: i32,
    pub height: i32,
    pub door_padding: i32,
    pub rooms: RoomSizeConfig,
    pub max_rooms: usize,
    pub max_placement_attempts: usize,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            door_padding: 2,
            rooms: RoomSizeConfig::default(),
            max_rooms: 50,
            max_placement_attempts: 500,
        }
    }
}

impl DungeonConfig {
    fn door_gap(&self) -> i32 {
        self.door_padding.max(MIN_DOOR_CORNER_GAP)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let min_side = 2 * self.door_gap() + 2;
        for (axis, range, limit) in [
            ("width", self.rooms.width, self.width),
            ("height", self.rooms.height, self.height),
        ] {
            if range.min > range.max {
                return Err(invalid(format!(
                    "room {axis} range {}..={} is empty",
                    range.min, range.max
                )));
            }
            if range.first_allowed() > range.last_allowed() {
                return Err(invalid(format!(
                    "room {axis} range {}..={} holds no odd size",
                    range.min, range.max
                )));
            }
            if range.first_allowed() < min_side {
                return Err(invalid(format!(
                    "room {axis} {} is too small for door padding {} (need at least {min_side})",
                    range.first_allowed(),
                    self.door_padding
                )));
            }
            if range.last_allowed() > limit {
                return Err(invalid(format!(
                    "room {axis} {} does not fit in a dungeon {axis} of {limit}",
                    range.last_allowed()
                )));
            }
        }
        if self.max_rooms < 2 {
            return Err(invalid(format!(
                "max_rooms must allow a start and an end room, got {}",
                self.max_rooms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid dungeon config: {reason}")]
    InvalidConfig { reason: String },
    #[error("dungeon layout placed only {placed} room(s) after {attempts} attempts; at least 2 are required")]
    TooFewRooms { placed: usize, attempts: usize },
}

fn invalid(reason: String) -> LayoutError {
    LayoutError::InvalidConfig { reason }
}

/// Grows a dungeon outward from a centred first room. Every new room is
/// attached flush to a side of an existing room with a door on each so the
/// two openings touch.
pub fn generate<R: Rng + ?Sized>(config: &DungeonConfig, rng: &mut R) -> Result<Dungeon, LayoutError> {
    config.validate()?;

    let first_width = config.rooms.width.sample(rng);
    let first_height = config.rooms.height.sample(rng);
    let mut rooms = vec![Room::new(
        (config.width - first_width) / 2,
        (config.height - first_height) / 2,
        first_width,
        first_height,
    )];

    let mut attempts = 0usize;
    while rooms.len() < config.max_rooms && attempts < config.max_placement_attempts {
        attempts += 1;
        let anchor_index = rng.gen_range(0..rooms.len());
        let side = DoorSide::ALL[rng.gen_range(0..DoorSide::ALL.len())];
        let width = config.rooms.width.sample(rng);
        let height = config.rooms.height.sample(rng);

        let Some(attachment) = attach(&rooms[anchor_index], side, width, height, config.door_gap(), rng)
        else {
            continue;
        };
        if !fits(&attachment.room, config) || rooms.iter().any(|room| room.overlaps(&attachment.room)) {
            continue;
        }
        if !door_is_clear(&rooms[anchor_index], attachment.anchor_door) {
            continue;
        }

        rooms[anchor_index].add_door(attachment.anchor_door);
        rooms.push(attachment.room);
    }

    if rooms.len() < 2 {
        return Err(LayoutError::TooFewRooms {
            placed: rooms.len(),
            attempts,
        });
    }
    Ok(Dungeon::new(config.width, config.height, rooms))
}

struct Attachment {
    room: Room,
    anchor_door: DoorLocation,
}

fn attach<R: Rng + ?Sized>(
    anchor: &Room,
    side: DoorSide,
    width: i32,
    height: i32,
    gap: i32,
    rng: &mut R,
) -> Option<Attachment> {
    match side {
        DoorSide::Top | DoorSide::Bottom => {
            let anchor_dx = door_offset(anchor.width(), gap, rng)?;
            let new_dx = door_offset(width, gap, rng)?;
            let new_x = anchor.x() + anchor_dx - new_dx;
            let (new_y, anchor_dy, new_dy) = if side == DoorSide::Top {
                (anchor.top() - height, 0, height - 1)
            } else {
                (anchor.bottom() + 1, anchor.height() - 1, 0)
            };
            Some(Attachment {
                room: Room::new(new_x, new_y, width, height)
                    .with_doors([DoorLocation::new(new_dx, new_dy)]),
                anchor_door: DoorLocation::new(anchor_dx, anchor_dy),
            })
        }
        DoorSide::Left | DoorSide::Right => {
            let anchor_dy = door_offset(anchor.height(), gap, rng)?;
            let new_dy = door_offset(height, gap, rng)?;
            let new_y = anchor.y() + anchor_dy - new_dy;
            let (new_x, anchor_dx, new_dx) = if side == DoorSide::Left {
                (anchor.left() - width, 0, width - 1)
            } else {
                (anchor.right() + 1, anchor.width() - 1, 0)
            };
            Some(Attachment {
                room: Room::new(new_x, new_y, width, height)
                    .with_doors([DoorLocation::new(new_dx, new_dy)]),
                anchor_door: DoorLocation::new(anchor_dx, anchor_dy),
            })
        }
    }
}

/// Door offset along an edge of `length` tiles, at least `gap` from the
/// leading corner and `gap + 1` from the trailing one.
fn door_offset<R: Rng + ?Sized>(length: i32, gap: i32, rng: &mut R) -> Option<i32> {
    let high = length - gap - 2;
    (gap <= high).then(|| rng.gen_range(gap..=high))
}

fn fits(room: &Room, config: &DungeonConfig) -> bool {
    room.left() >= 0 && room.top() >= 0 && room.right() < config.width && room.bottom() < config.height
}

fn door_is_clear(room: &Room, candidate: DoorLocation) -> bool {
    room.doors().iter().all(|door| {
        let same_row = door.y == candidate.y && (door.x - candidate.x).abs() < MIN_DOOR_SPACING;
        let same_column = door.x == candidate.x && (door.y - candidate.y).abs() < MIN_DOOR_SPACING;
        !same_row && !same_column
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn door_side(room: &Room, door: DoorLocation) -> Option<DoorSide> {
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

    #[test]
    fn odd_sampling_stays_odd_and_in_range() {
        let range = DimensionRange {
            min: 6,
            max: 12,
            only_odd: true,
        };
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let value = range.sample(&mut rng);
            assert_eq!(value % 2, 1);
            assert!((7..=11).contains(&value));
        }
    }

    #[test]
    fn generated_rooms_are_in_bounds_and_disjoint() {
        let config = DungeonConfig::default();
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let dungeon = generate(&config, &mut rng).expect("layout");
            assert!(dungeon.room_count() >= 2);
            for (index, room) in dungeon.rooms().iter().enumerate() {
                assert!(fits(room, &config));
                assert_eq!(room.width() % 2, 1);
                assert_eq!(room.height() % 2, 1);
                for other in &dungeon.rooms()[index + 1..] {
                    assert!(!room.overlaps(other), "seed {seed}: {room:?} overlaps {other:?}");
                }
            }
        }
    }

    #[test]
    fn every_door_is_on_an_edge_off_the_corners_and_faces_a_partner() {
        let config = DungeonConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let dungeon = generate(&config, &mut rng).expect("layout");

        for room in dungeon.rooms() {
            for door in room.doors() {
                let side = door_side(room, *door).expect("door on an edge");
                let (along, length) = match side {
                    DoorSide::Top | DoorSide::Bottom => (door.x, room.width()),
                    DoorSide::Left | DoorSide::Right => (door.y, room.height()),
                };
                assert!(along >= 2 && along <= length - 4);

                let (ax, ay) = (room.x() + door.x, room.y() + door.y);
                let (px, py) = match side {
                    DoorSide::Top => (ax, ay - 1),
                    DoorSide::Bottom => (ax, ay + 1),
                    DoorSide::Left => (ax - 1, ay),
                    DoorSide::Right => (ax + 1, ay),
                };
                let partner = dungeon.get_room_at(px, py).expect("partner room");
                let partner = dungeon.room(partner).expect("room");
                assert!(partner
                    .doors()
                    .iter()
                    .any(|d| partner.x() + d.x == px && partner.y() + d.y == py));
            }
        }
    }

    #[test]
    fn door_count_matches_connections() {
        let mut rng = StdRng::seed_from_u64(5);
        let dungeon = generate(&DungeonConfig::default(), &mut rng).expect("layout");
        let doors: usize = dungeon.rooms().iter().map(|room| room.doors().len()).sum();
        assert_eq!(doors, 2 * (dungeon.room_count() - 1));
    }

    #[test]
    fn cramped_dungeon_reports_too_few_rooms() {
        let config = DungeonConfig {
            width: 9,
            height: 9,
            rooms: RoomSizeConfig {
                width: DimensionRange {
                    min: 7,
                    max: 9,
                    only_odd: true,
                },
                height: DimensionRange {
                    min: 7,
                    max: 9,
                    only_odd: true,
                },
            },
            max_placement_attempts: 20,
            ..DungeonConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate(&config, &mut rng),
            Err(LayoutError::TooFewRooms { placed: 1, .. })
        ));
    }

    #[test]
    fn even_only_range_with_odd_flag_is_rejected() {
        let config = DungeonConfig {
            rooms: RoomSizeConfig {
                width: DimensionRange {
                    min: 8,
                    max: 8,
                    only_odd: true,
                },
                ..RoomSizeConfig::default()
            },
            ..DungeonConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate(&config, &mut rng),
            Err(LayoutError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rooms_too_small_for_padding_are_rejected() {
        let config = DungeonConfig {
            door_padding: 4,
            ..DungeonConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate(&config, &mut rng),
            Err(LayoutError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn same_seed_same_layout() {
        let config = DungeonConfig::default();
        let a = generate(&config, &mut StdRng::seed_from_u64(42)).expect("a");
        let b = generate(&config, &mut StdRng::seed_from_u64(42)).expect("b");
        assert_eq!(a, b);
    }
}
