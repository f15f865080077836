use std::error::Error as StdError;
use std::ops::{Add, Mul};

use thiserror::Error;

use super::input::InputSnapshot;
use crate::tilemap::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Tear the scene down and load it again from scratch.
    Rebuild,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalized_or_zero(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Self::ZERO;
        }
        Self {
            x: self.x / length,
            y: self.y / length,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.25;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        if !self.zoom.is_finite() {
            return CAMERA_ZOOM_DEFAULT;
        }
        self.zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
    }

    /// Centers on `target`, keeping the view inside `[0,width)×[0,height)` world
    /// units when the viewport is smaller than the bounds.
    pub fn follow_within(&mut self, target: Vec2, view_world: Vec2, bounds_world: Vec2) {
        self.position.x = clamp_axis(target.x, view_world.x, bounds_world.x);
        self.position.y = clamp_axis(target.y, view_world.y, bounds_world.y);
    }
}

fn clamp_axis(target: f32, view: f32, bounds: f32) -> f32 {
    let half_view = view * 0.5;
    if view >= bounds {
        return bounds * 0.5;
    }
    target.clamp(half_view, bounds - half_view)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderableKind {
    Placeholder,
    Tinted([u8; 4]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub debug_name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub renderable: RenderableDesc,
    /// Half-size in world units, used for drawing.
    pub half_extent: f32,
}

#[derive(Debug, Default)]
struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    camera: Camera2D,
    tile_grid: Option<TileGrid>,
    fade: f32,
    title: Option<String>,
    view_size: Vec2,
}

impl SceneWorld {
    pub fn spawn(
        &mut self,
        transform: Transform,
        renderable: RenderableDesc,
        half_extent: f32,
    ) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            renderable,
            half_extent,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            let pending = std::mem::take(&mut self.pending_despawns);
            self.entities.retain(|entity| !pending.contains(&entity.id));
            self.pending_spawns
                .retain(|entity| !pending.contains(&entity.id));
        }
        self.entities.append(&mut self.pending_spawns);
    }

    /// Drops everything the scene built. The id allocator and view size
    /// belong to the runtime and survive.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.camera = Camera2D::default();
        self.tile_grid = None;
        self.fade = 0.0;
        self.title = None;
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn set_tile_grid(&mut self, grid: TileGrid) {
        self.tile_grid = Some(grid);
    }

    pub fn take_tile_grid(&mut self) -> Option<TileGrid> {
        self.tile_grid.take()
    }

    pub fn tile_grid(&self) -> Option<&TileGrid> {
        self.tile_grid.as_ref()
    }

    pub fn tile_grid_mut(&mut self) -> Option<&mut TileGrid> {
        self.tile_grid.as_mut()
    }

    /// Full-screen fade to black, `0.0` clear to `1.0` opaque.
    pub fn set_fade(&mut self, fade: f32) {
        self.fade = if fade.is_finite() {
            fade.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn fade(&self) -> f32 {
        self.fade
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// World-space extent the window currently shows. Zero before the first
    /// frame.
    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn set_view_size(&mut self, view_size: Vec2) {
        self.view_size = view_size;
    }
}

#[derive(Debug, Error)]
#[error("scene '{scene}' failed to load: {source}")]
pub struct SceneLoadError {
    pub scene: &'static str,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl SceneLoadError {
    pub fn new(scene: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            scene,
            source: Box::new(source),
        }
    }
}

pub trait Scene {
    fn name(&self) -> &'static str;
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), SceneLoadError>;
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn scene_name(&self) -> &'static str {
        self.scene.name()
    }

    pub(crate) fn load(&mut self) -> Result<(), SceneLoadError> {
        if self.is_loaded {
            return Ok(());
        }
        self.scene.load(&mut self.world)?;
        self.world.apply_pending();
        self.is_loaded = true;
        Ok(())
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let command = self
            .scene
            .update(fixed_dt_seconds, input, &mut self.world);
        self.world.apply_pending();
        command
    }

    /// Unloads, wipes the world, and loads again. Nothing from the previous
    /// load survives into the new one.
    pub(crate) fn rebuild(&mut self) -> Result<(), SceneLoadError> {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
        }
        self.world.clear();
        self.is_loaded = false;
        self.load()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.world.clear();
            self.is_loaded = false;
        }
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }
}
