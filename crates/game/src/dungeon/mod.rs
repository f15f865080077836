mod layout;

pub use layout::{generate, DungeonConfig, LayoutError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub usize);

/// Edge of a room a door sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl DoorSide {
    pub const ALL: [DoorSide; 4] = [
        DoorSide::Top,
        DoorSide::Bottom,
        DoorSide::Left,
        DoorSide::Right,
    ];
}

/// Door position relative to the owning room's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoorLocation {
    pub x: i32,
    pub y: i32,
}

impl DoorLocation {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned room including its walls. `right` and `bottom` are the last
/// wall column and row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    doors: Vec<DoorLocation>,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            doors: Vec::new(),
        }
    }

    pub fn with_doors(mut self, doors: impl IntoIterator<Item = DoorLocation>) -> Self {
        self.doors.extend(doors);
        self
    }

    pub(crate) fn add_door(&mut self, door: DoorLocation) {
        self.doors.push(door);
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn center(&self) -> (i32, i32) {
        (self.center_x(), self.center_y())
    }

    pub fn doors(&self) -> &[DoorLocation] {
        &self.doors
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    pub fn overlaps(&self, other: &Room) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dungeon {
    width: i32,
    height: i32,
    rooms: Vec<Room>,
}

impl Dungeon {
    /// Rooms keep their order; the first one is where the player starts.
    pub fn new(width: i32, height: i32, rooms: Vec<Room>) -> Self {
        Self {
            width,
            height,
            rooms,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> {
        (0..self.rooms.len()).map(RoomId)
    }

    pub fn get_room_at(&self, x: i32, y: i32) -> Option<RoomId> {
        self.rooms
            .iter()
            .position(|room| room.contains(x, y))
            .map(RoomId)
    }

    /// `#` wall, `.` floor, `+` door, space outside any room.
    pub fn draw_to_string(&self) -> String {
        let width = self.width.max(0) as usize;
        let height = self.height.max(0) as usize;
        let mut cells = vec![vec![' '; width]; height];
        let mut plot = |x: i32, y: i32, glyph: char| {
            if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                cells[y as usize][x as usize] = glyph;
            }
        };

        for room in &self.rooms {
            for y in room.top()..=room.bottom() {
                for x in room.left()..=room.right() {
                    let on_edge = x == room.left()
                        || x == room.right()
                        || y == room.top()
                        || y == room.bottom();
                    plot(x, y, if on_edge { '#' } else { '.' });
                }
            }
            for door in room.doors() {
                plot(room.x() + door.x, room.y() + door.y, '+');
            }
        }

        cells
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
