mod grid;
mod layer;
mod pattern;
mod triggers;
mod weighted;

pub use grid::{TileGrid, GROUND_LAYER, SHADOW_LAYER, STUFF_LAYER};
pub use layer::TileLayer;
pub use pattern::TilePattern;
pub use triggers::TileTriggers;
pub use weighted::{WeightedTile, WeightedTiles};
