use engine::{
    EntityId, InputSnapshot, RenderableDesc, RenderableKind, SceneWorld, TileGrid, Transform, Vec2,
};

pub const PLAYER_HALF_EXTENT: f32 = 0.3;
const PLAYER_COLOR: [u8; 4] = [236, 226, 198, 255];

/// The player entity: moves with the input axis and slides along walls.
#[derive(Debug, Clone)]
pub struct Player {
    id: EntityId,
    speed: f32,
    frozen: bool,
}

impl Player {
    pub fn spawn(world: &mut SceneWorld, position: Vec2, speed: f32) -> Self {
        let id = world.spawn(
            Transform { position },
            RenderableDesc {
                kind: RenderableKind::Tinted(PLAYER_COLOR),
                debug_name: "player",
            },
            PLAYER_HALF_EXTENT,
        );
        Self {
            id,
            speed,
            frozen: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Input is ignored from now on.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn destroy(self, world: &mut SceneWorld) {
        world.despawn(self.id);
    }

    pub fn position(&self, world: &SceneWorld) -> Option<Vec2> {
        world
            .find_entity(self.id)
            .map(|entity| entity.transform.position)
    }

    pub fn update(&mut self, world: &mut SceneWorld, input: &InputSnapshot, dt_seconds: f32) {
        if self.frozen {
            return;
        }
        let axis = input.movement_axis();
        if axis == Vec2::ZERO {
            return;
        }
        let (Some(from), Some(grid)) = (self.position(world), world.tile_grid()) else {
            return;
        };
        let to = move_with_collision(grid, from, axis * (self.speed * dt_seconds), PLAYER_HALF_EXTENT);
        if let Some(entity) = world.find_entity_mut(self.id) {
            entity.transform.position = to;
        }
    }
}

/// Applies `delta` one axis at a time so a blocked axis does not stop
/// movement along the other.
pub fn move_with_collision(grid: &TileGrid, from: Vec2, delta: Vec2, half_extent: f32) -> Vec2 {
    let mut position = from;
    let moved_x = Vec2::new(position.x + delta.x, position.y);
    if !overlaps_blocking_tile(grid, moved_x, half_extent) {
        position = moved_x;
    }
    let moved_y = Vec2::new(position.x, position.y + delta.y);
    if !overlaps_blocking_tile(grid, moved_y, half_extent) {
        position = moved_y;
    }
    position
}

fn overlaps_blocking_tile(grid: &TileGrid, center: Vec2, half_extent: f32) -> bool {
    let min_x = (center.x - half_extent).floor() as i32;
    let max_x = (center.x + half_extent).floor() as i32;
    let min_y = (center.y - half_extent).floor() as i32;
    let max_y = (center.y + half_extent).floor() as i32;
    (min_y..=max_y).any(|y| (min_x..=max_x).any(|x| grid.blocks_movement(x, y)))
}
