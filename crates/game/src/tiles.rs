use engine::{TilePalette, TilePattern, WeightedTile, WeightedTiles};
use serde::{Deserialize, Serialize};

use crate::dungeon::DoorSide;

pub const BLANK: u16 = 20;
pub const FLOOR: u16 = 6;
pub const FLOOR_VARIANTS: [u16; 3] = [7, 8, 26];

pub const WALL_TOP_LEFT: u16 = 3;
pub const WALL_TOP_RIGHT: u16 = 4;
pub const WALL_BOTTOM_LEFT: u16 = 22;
pub const WALL_BOTTOM_RIGHT: u16 = 23;
pub const WALL_TOP: u16 = 39;
pub const WALL_LEFT: u16 = 21;
pub const WALL_RIGHT: u16 = 19;
pub const WALL_BOTTOM: u16 = 1;

pub const CORNERS: [u16; 4] = [
    WALL_TOP_LEFT,
    WALL_TOP_RIGHT,
    WALL_BOTTOM_LEFT,
    WALL_BOTTOM_RIGHT,
];

pub const DOOR_JAMB_LEFT: u16 = 40;
pub const DOOR_JAMB_RIGHT: u16 = 38;

pub const CHEST: u16 = 166;
pub const STAIRS: u16 = 81;
pub const POTS: [u16; 3] = [13, 32, 51];
pub const TOWER_TOP: u16 = 186;
pub const TOWER_BASE: u16 = 205;

/// Weighted tables and stamps used to paint a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileTheme {
    pub floor: WeightedTiles,
    pub wall_top: WeightedTiles,
    pub wall_bottom: WeightedTiles,
    pub wall_left: WeightedTiles,
    pub wall_right: WeightedTiles,
    pub pot: WeightedTiles,
    pub door_top: TilePattern,
    pub door_bottom: TilePattern,
    pub door_left: TilePattern,
    pub door_right: TilePattern,
    pub tower: TilePattern,
}

impl Default for TileTheme {
    fn default() -> Self {
        Self {
            floor: WeightedTiles::new(vec![
                WeightedTile::new([FLOOR], 9.0),
                WeightedTile::new(FLOOR_VARIANTS, 1.0),
            ]),
            wall_top: WeightedTiles::new(vec![
                WeightedTile::new([WALL_TOP], 4.0),
                WeightedTile::new([57, 58, 59], 1.0),
            ]),
            wall_bottom: WeightedTiles::new(vec![
                WeightedTile::new([WALL_BOTTOM], 4.0),
                WeightedTile::new([78, 79, 80], 1.0),
            ]),
            wall_left: WeightedTiles::new(vec![
                WeightedTile::new([WALL_LEFT], 4.0),
                WeightedTile::new([76, 95, 114], 1.0),
            ]),
            wall_right: WeightedTiles::new(vec![
                WeightedTile::new([WALL_RIGHT], 4.0),
                WeightedTile::new([77, 96, 115], 1.0),
            ]),
            pot: WeightedTiles::new(POTS.iter().map(|pot| WeightedTile::new([*pot], 1.0)).collect()),
            door_top: TilePattern::row([DOOR_JAMB_LEFT, FLOOR, DOOR_JAMB_RIGHT]),
            door_bottom: TilePattern::row([FLOOR, WALL_BOTTOM, WALL_BOTTOM]),
            door_left: TilePattern::column([DOOR_JAMB_LEFT, FLOOR, DOOR_JAMB_RIGHT]),
            door_right: TilePattern::column([DOOR_JAMB_RIGHT, FLOOR, DOOR_JAMB_LEFT]),
            tower: TilePattern::column([TOWER_TOP, TOWER_BASE]),
        }
    }
}

impl TileTheme {
    pub fn door_stamp(&self, side: DoorSide) -> &TilePattern {
        match side {
            DoorSide::Top => &self.door_top,
            DoorSide::Bottom => &self.door_bottom,
            DoorSide::Left => &self.door_left,
            DoorSide::Right => &self.door_right,
        }
    }

    /// Cell of the door stamp that lands on the descriptor tile.
    pub fn door_opening_offset(side: DoorSide) -> (usize, usize) {
        match side {
            DoorSide::Top => (1, 0),
            DoorSide::Bottom => (0, 0),
            DoorSide::Left | DoorSide::Right => (0, 1),
        }
    }

    pub fn door_opening(&self, side: DoorSide) -> Option<u16> {
        let (dx, dy) = Self::door_opening_offset(side);
        self.door_stamp(side).tile_at(dx, dy)
    }

    /// Tiles the player may walk over. Everything else painted on the ground
    /// or stuff layer blocks.
    pub fn passable_tiles(&self) -> Vec<u16> {
        let mut passable = vec![BLANK, STAIRS];
        passable.extend(self.floor.all_indices());
        passable.extend(DoorSide::ALL.iter().filter_map(|side| self.door_opening(*side)));
        passable.sort_unstable();
        passable.dedup();
        passable
    }
}

/// Flat colours for drawing without a tileset image.
pub fn fallback_palette(theme: &TileTheme) -> TilePalette {
    let mut entries = vec![
        (BLANK, [0, 0, 0, 255]),
        (DOOR_JAMB_LEFT, [92, 70, 58, 255]),
        (DOOR_JAMB_RIGHT, [92, 70, 58, 255]),
        (CHEST, [214, 170, 48, 255]),
        (STAIRS, [120, 200, 230, 255]),
        (TOWER_TOP, [150, 150, 170, 255]),
        (TOWER_BASE, [110, 110, 130, 255]),
    ];
    entries.extend(CORNERS.iter().map(|corner| (*corner, [70, 64, 78, 255])));
    entries.extend(theme.floor.all_indices().map(|tile| (tile, [58, 44, 38, 255])));
    for walls in [&theme.wall_top, &theme.wall_bottom, &theme.wall_left, &theme.wall_right] {
        entries.extend(walls.all_indices().map(|tile| (tile, [96, 88, 104, 255])));
    }
    entries.extend(theme.pot.all_indices().map(|tile| (tile, [196, 110, 60, 255])));
    TilePalette::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_door_openings_are_floor() {
        let theme = TileTheme::default();
        for side in DoorSide::ALL {
            assert_eq!(theme.door_opening(side), Some(FLOOR));
        }
    }

    #[test]
    fn passable_set_excludes_walls_and_props() {
        let passable = TileTheme::default().passable_tiles();
        for tile in [BLANK, FLOOR, 7, 8, 26, STAIRS] {
            assert!(passable.contains(&tile), "{tile} should be passable");
        }
        for tile in [WALL_TOP, WALL_BOTTOM, DOOR_JAMB_LEFT, CHEST, TOWER_TOP, 13] {
            assert!(!passable.contains(&tile), "{tile} should block");
        }
        for corner in CORNERS {
            assert!(!passable.contains(&corner));
        }
    }

    #[test]
    fn theme_round_trips_through_json_with_partial_override() {
        let theme: TileTheme = serde_json::from_str(r#"{ "floor": [{ "indices": [6], "weight": 1.0 }] }"#)
            .expect("theme");
        assert_eq!(theme.floor.all_indices().collect::<Vec<_>>(), vec![6]);
        assert_eq!(theme.door_top, TileTheme::default().door_top);
    }

    #[test]
    fn palette_colours_every_default_tile() {
        let theme = TileTheme::default();
        let palette = fallback_palette(&theme);
        assert_eq!(palette.color_for(BLANK), [0, 0, 0, 255]);
        assert_ne!(palette.color_for(WALL_TOP), palette.color_for(FLOOR));
    }
}
