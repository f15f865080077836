use crate::app::{Camera2D, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub fn pixels_per_world(tile_size_px: u32, camera: &Camera2D) -> f32 {
    tile_size_px.max(1) as f32 * camera.effective_zoom()
}

/// Screen position of `world`, with the camera at the viewport center. Both
/// spaces grow downward in y.
pub fn world_to_screen(
    world: Vec2,
    camera: &Camera2D,
    viewport: Viewport,
    pixels_per_world: f32,
) -> (i32, i32) {
    let x = (world.x - camera.position.x) * pixels_per_world + viewport.width as f32 * 0.5;
    let y = (world.y - camera.position.y) * pixels_per_world + viewport.height as f32 * 0.5;
    (x.round() as i32, y.round() as i32)
}

/// World-space extent covered by the viewport.
pub fn view_size_world(viewport: Viewport, pixels_per_world: f32) -> Vec2 {
    if !(pixels_per_world > f32::EPSILON) {
        return Vec2::ZERO;
    }
    Vec2 {
        x: viewport.width as f32 / pixels_per_world,
        y: viewport.height as f32 / pixels_per_world,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_position_maps_to_viewport_center() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D {
            position: Vec2 { x: 10.0, y: 4.0 },
            ..Camera2D::default()
        };
        assert_eq!(
            world_to_screen(camera.position, &camera, viewport, 48.0),
            (400, 300)
        );
    }

    #[test]
    fn y_grows_downward_on_screen() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D::default();
        let (_, above) = world_to_screen(Vec2 { x: 0.0, y: -1.0 }, &camera, viewport, 10.0);
        let (_, below) = world_to_screen(Vec2 { x: 0.0, y: 1.0 }, &camera, viewport, 10.0);
        assert_eq!(above, 290);
        assert_eq!(below, 310);
    }

    #[test]
    fn view_size_scales_with_zoom() {
        let viewport = Viewport {
            width: 960,
            height: 480,
        };
        let camera = Camera2D {
            zoom: 2.0,
            ..Camera2D::default()
        };
        let size = view_size_world(viewport, pixels_per_world(48, &camera));
        assert_eq!(size, Vec2 { x: 10.0, y: 5.0 });
    }
}
