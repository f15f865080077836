mod renderer;
mod tileset;
mod transform;

pub use renderer::{Renderer, TilePalette};
pub use tileset::{TilesetAtlas, TilesetConfig, TilesetError};
pub use transform::{pixels_per_world, view_size_world, world_to_screen, Viewport};

pub const PLACEHOLDER_COLOR: [u8; 4] = [240, 240, 240, 255];
