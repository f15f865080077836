use std::collections::HashSet;

use rand::Rng;

use super::{TilePattern, TileTriggers, WeightedTiles};

/// A single plane of tile indices with per-cell alpha.
///
/// Coordinates are signed so callers can pass positions derived from room
/// arithmetic without pre-clipping; anything outside `[0,width)×[0,height)`
/// is ignored by writes and reported as absent by reads.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    name: String,
    width: u32,
    height: u32,
    tiles: Vec<Option<u16>>,
    alphas: Vec<f32>,
    passable: Option<HashSet<u16>>,
    triggers: TileTriggers,
}

impl TileLayer {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let cell_count = width as usize * height as usize;
        Self {
            name: name.into(),
            width,
            height,
            tiles: vec![None; cell_count],
            alphas: vec![1.0; cell_count],
            passable: None,
            triggers: TileTriggers::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).is_some()
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<u16> {
        self.index_of(x, y).and_then(|index| self.tiles[index])
    }

    pub fn alpha_at(&self, x: i32, y: i32) -> Option<f32> {
        self.index_of(x, y).map(|index| self.alphas[index])
    }

    pub fn put_tile_at(&mut self, tile: u16, x: i32, y: i32) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.tiles[index] = Some(tile);
                true
            }
            None => false,
        }
    }

    /// Returns the number of cells written.
    pub fn fill(&mut self, tile: u16, x: i32, y: i32, width: i32, height: i32) -> usize {
        let mut written = 0;
        for index in self.clipped_indices(x, y, width, height) {
            self.tiles[index] = Some(tile);
            written += 1;
        }
        written
    }

    /// Stamps `pattern` with its top-left cell at `(x, y)`.
    pub fn put_tiles_at(&mut self, pattern: &TilePattern, x: i32, y: i32) -> usize {
        let mut written = 0;
        for (dx, dy, tile) in pattern.cells() {
            if self.put_tile_at(tile, x + dx, y + dy) {
                written += 1;
            }
        }
        written
    }

    /// Fills each cell in the area with an independent draw from `table`.
    pub fn weighted_randomize<R: Rng + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        table: &WeightedTiles,
        rng: &mut R,
    ) -> usize {
        let mut written = 0;
        for index in self.clipped_indices(x, y, width, height) {
            if let Some(tile) = table.sample(rng) {
                self.tiles[index] = Some(tile);
                written += 1;
            }
        }
        written
    }

    pub fn set_alpha(&mut self, x: i32, y: i32, width: i32, height: i32, alpha: f32) -> usize {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let mut touched = 0;
        for index in self.clipped_indices(x, y, width, height) {
            self.alphas[index] = alpha;
            touched += 1;
        }
        touched
    }

    /// Every tile index except `excluded` blocks movement. Empty cells never do.
    pub fn set_collision_by_exclusion(&mut self, excluded: impl IntoIterator<Item = u16>) {
        self.passable = Some(excluded.into_iter().collect());
    }

    pub fn collides_at(&self, x: i32, y: i32) -> bool {
        let Some(index) = self.index_of(x, y) else {
            return true;
        };
        match (&self.passable, self.tiles[index]) {
            (Some(passable), Some(tile)) => !passable.contains(&tile),
            _ => false,
        }
    }

    pub fn triggers(&self) -> &TileTriggers {
        &self.triggers
    }

    pub fn triggers_mut(&mut self) -> &mut TileTriggers {
        &mut self.triggers
    }

    /// Fires the trigger registered for the tile under `(x, y)`, if armed.
    pub fn fire_trigger_at(&mut self, x: i32, y: i32) -> Option<u16> {
        let tile = self.tile_at(x, y)?;
        self.triggers.take(tile).then_some(tile)
    }

    pub fn count_tiles(&self, tile: u16) -> usize {
        self.tiles.iter().filter(|cell| **cell == Some(tile)).count()
    }

    fn clipped_indices(&self, x: i32, y: i32, width: i32, height: i32) -> Vec<usize> {
        if width <= 0 || height <= 0 {
            return Vec::new();
        }
        let x_min = x.max(0);
        let y_min = y.max(0);
        let x_max = x.saturating_add(width).min(self.width as i32);
        let y_max = y.saturating_add(height).min(self.height as i32);
        let mut indices = Vec::new();
        for cell_y in y_min..y_max {
            for cell_x in x_min..x_max {
                indices.push(cell_y as usize * self.width as usize + cell_x as usize);
            }
        }
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::WeightedTile;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_layer_is_empty_and_opaque() {
        let layer = TileLayer::new("Ground", 4, 3);
        assert_eq!(layer.tile_at(0, 0), None);
        assert_eq!(layer.alpha_at(3, 2), Some(1.0));
        assert_eq!(layer.alpha_at(4, 2), None);
    }

    #[test]
    fn writes_outside_bounds_are_clipped() {
        let mut layer = TileLayer::new("Ground", 4, 4);
        assert!(!layer.put_tile_at(1, -1, 0));
        assert!(!layer.put_tile_at(1, 4, 0));
        assert_eq!(layer.fill(9, -2, -2, 4, 4), 4);
        assert_eq!(layer.count_tiles(9), 4);
        assert_eq!(layer.fill(9, 0, 0, 0, 3), 0);
    }

    #[test]
    fn pattern_stamp_writes_relative_to_anchor() {
        let mut layer = TileLayer::new("Ground", 5, 5);
        let written = layer.put_tiles_at(&TilePattern::column([40, 6, 38]), 2, 1);
        assert_eq!(written, 3);
        assert_eq!(layer.tile_at(2, 1), Some(40));
        assert_eq!(layer.tile_at(2, 2), Some(6));
        assert_eq!(layer.tile_at(2, 3), Some(38));
    }

    #[test]
    fn weighted_randomize_only_uses_table_indices() {
        let mut layer = TileLayer::new("Ground", 6, 6);
        let table = WeightedTiles::new(vec![
            WeightedTile::new([6], 9.0),
            WeightedTile::new([7, 8, 26], 1.0),
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(layer.weighted_randomize(1, 1, 4, 4, &table, &mut rng), 16);
        for y in 1..5 {
            for x in 1..5 {
                let tile = layer.tile_at(x, y).expect("tile");
                assert!([6, 7, 8, 26].contains(&tile));
            }
        }
        assert_eq!(layer.tile_at(0, 0), None);
    }

    #[test]
    fn collision_by_exclusion() {
        let mut layer = TileLayer::new("Ground", 3, 1);
        layer.put_tile_at(6, 0, 0);
        layer.put_tile_at(39, 1, 0);
        layer.set_collision_by_exclusion([6]);

        assert!(!layer.collides_at(0, 0));
        assert!(layer.collides_at(1, 0));
        assert!(!layer.collides_at(2, 0), "empty cells are passable");
        assert!(layer.collides_at(-1, 0), "outside the layer blocks");
    }

    #[test]
    fn layer_without_collision_config_never_collides_in_bounds() {
        let mut layer = TileLayer::new("Stuff", 2, 2);
        layer.put_tile_at(186, 0, 0);
        assert!(!layer.collides_at(0, 0));
    }

    #[test]
    fn trigger_fires_once_for_matching_tile() {
        let mut layer = TileLayer::new("Stuff", 3, 3);
        layer.put_tile_at(81, 1, 1);
        layer.triggers_mut().arm(81);

        assert_eq!(layer.fire_trigger_at(0, 0), None);
        assert_eq!(layer.fire_trigger_at(1, 1), Some(81));
        assert_eq!(layer.fire_trigger_at(1, 1), None);
    }

    #[test]
    fn set_alpha_clamps_and_counts() {
        let mut layer = TileLayer::new("Shadow", 4, 4);
        assert_eq!(layer.set_alpha(1, 1, 2, 2, 0.5), 4);
        assert_eq!(layer.alpha_at(1, 1), Some(0.5));
        assert_eq!(layer.alpha_at(0, 0), Some(1.0));
        layer.set_alpha(0, 0, 1, 1, 3.0);
        assert_eq!(layer.alpha_at(0, 0), Some(1.0));
    }
}
