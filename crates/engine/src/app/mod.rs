mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    pixels_per_world, view_size_world, world_to_screen, Renderer, TilePalette, TilesetAtlas,
    TilesetConfig, TilesetError, Viewport, PLACEHOLDER_COLOR,
};
pub use scene::{
    Camera2D, Entity, EntityId, RenderableDesc, RenderableKind, Scene, SceneCommand,
    SceneLoadError, SceneWorld, Transform, Vec2, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX,
    CAMERA_ZOOM_MIN,
};
