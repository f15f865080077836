use crate::app::Vec2;

use super::TileLayer;

pub const GROUND_LAYER: &str = "Ground";
pub const STUFF_LAYER: &str = "Stuff";
pub const SHADOW_LAYER: &str = "Shadow";

/// The three stacked planes of a level: base tiles, props, and fog.
///
/// World units are tiles: tile `(x, y)` spans `[x, x+1) × [y, y+1)` in world
/// space, with y growing downward like the tile rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size_px: u32,
    pub ground: TileLayer,
    pub stuff: TileLayer,
    pub shadow: TileLayer,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tile_size_px: u32) -> Self {
        Self {
            width,
            height,
            tile_size_px: tile_size_px.max(1),
            ground: TileLayer::new(GROUND_LAYER, width, height),
            stuff: TileLayer::new(STUFF_LAYER, width, height),
            shadow: TileLayer::new(SHADOW_LAYER, width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size_px(&self) -> u32 {
        self.tile_size_px
    }

    /// Layers in draw order.
    pub fn layers(&self) -> [&TileLayer; 3] {
        [&self.ground, &self.stuff, &self.shadow]
    }

    pub fn tile_to_world(&self, x: i32, y: i32) -> Vec2 {
        Vec2 {
            x: x as f32,
            y: y as f32,
        }
    }

    pub fn tile_center_world(&self, x: i32, y: i32) -> Vec2 {
        self.tile_to_world(x, y) + Vec2::new(0.5, 0.5)
    }

    /// Tile containing `world`. May be outside the grid; callers bounds-check.
    pub fn world_to_tile(&self, world: Vec2) -> (i32, i32) {
        (world.x.floor() as i32, world.y.floor() as i32)
    }

    /// True when either the ground or the prop plane blocks the tile.
    pub fn blocks_movement(&self, x: i32, y: i32) -> bool {
        self.ground.collides_at(x, y) || self.stuff.collides_at(x, y)
    }
}
