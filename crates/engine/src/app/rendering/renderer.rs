use std::collections::HashMap;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Camera2D, Entity, RenderableKind, SceneWorld, Vec2};
use crate::tilemap::{TileGrid, TileLayer};

use super::tileset::TilesetAtlas;
use super::transform::{pixels_per_world, world_to_screen};
use super::{Viewport, PLACEHOLDER_COLOR};

const CLEAR_COLOR: [u8; 4] = [8, 8, 12, 255];
const TILE_FALLBACK_UNKNOWN_COLOR: [u8; 4] = [255, 0, 255, 255];
const FADE_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Solid colours used per tile index when no tileset atlas is loaded.
#[derive(Debug, Clone, Default)]
pub struct TilePalette {
    colors: HashMap<u16, [u8; 4]>,
}

impl TilePalette {
    pub fn new(entries: impl IntoIterator<Item = (u16, [u8; 4])>) -> Self {
        Self {
            colors: entries.into_iter().collect(),
        }
    }

    pub fn color_for(&self, tile: u16) -> [u8; 4] {
        self.colors
            .get(&tile)
            .copied()
            .unwrap_or(TILE_FALLBACK_UNKNOWN_COLOR)
    }
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    tileset: Option<TilesetAtlas>,
    palette: TilePalette,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        tileset: Option<TilesetAtlas>,
        palette: TilePalette,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            tileset,
            palette,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let tiles = TileSource {
            atlas: self.tileset.as_ref(),
            palette: &self.palette,
        };
        draw_world(self.pixels.frame_mut(), self.viewport, world, &tiles);
        self.pixels.render()
    }
}

struct TileSource<'a> {
    atlas: Option<&'a TilesetAtlas>,
    palette: &'a TilePalette,
}

impl TileSource<'_> {
    fn texel(&self, tile: u16, u: f32, v: f32) -> [u8; 4] {
        self.atlas
            .and_then(|atlas| atlas.sample(tile, u, v))
            .unwrap_or_else(|| self.palette.color_for(tile))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileRectInclusive {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
}

fn draw_world(frame: &mut [u8], viewport: Viewport, world: &SceneWorld, tiles: &TileSource<'_>) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&CLEAR_COLOR);
    }

    let tile_size_px = world.tile_grid().map_or(1, TileGrid::tile_size_px);
    let ppw = pixels_per_world(tile_size_px, world.camera());

    if let Some(grid) = world.tile_grid() {
        draw_layer(frame, viewport, world.camera(), ppw, &grid.ground, tiles);
        draw_layer(frame, viewport, world.camera(), ppw, &grid.stuff, tiles);
    }
    for entity in world.entities() {
        draw_entity(frame, viewport, world.camera(), ppw, entity);
    }
    if let Some(grid) = world.tile_grid() {
        draw_layer(frame, viewport, world.camera(), ppw, &grid.shadow, tiles);
    }

    let fade = world.fade();
    if fade > 0.0 {
        for chunk in frame.chunks_exact_mut(4) {
            blend_into(chunk, FADE_COLOR, fade);
        }
    }
}

fn draw_layer(
    frame: &mut [u8],
    viewport: Viewport,
    camera: &Camera2D,
    ppw: f32,
    layer: &TileLayer,
    tiles: &TileSource<'_>,
) {
    let Some(visible) = visible_tile_rect(layer, camera, viewport, ppw) else {
        return;
    };
    for y in visible.y_min..=visible.y_max {
        for x in visible.x_min..=visible.x_max {
            let Some(tile) = layer.tile_at(x, y) else {
                continue;
            };
            let alpha = layer.alpha_at(x, y).unwrap_or(1.0);
            if alpha <= 0.0 {
                continue;
            }
            let (left, top) = world_to_screen(
                Vec2::new(x as f32, y as f32),
                camera,
                viewport,
                ppw,
            );
            let (right, bottom) = world_to_screen(
                Vec2::new((x + 1) as f32, (y + 1) as f32),
                camera,
                viewport,
                ppw,
            );
            draw_tile(frame, viewport, (left, top, right, bottom), tile, alpha, tiles);
        }
    }
}

fn draw_tile(
    frame: &mut [u8],
    viewport: Viewport,
    (left, top, right, bottom): (i32, i32, i32, i32),
    tile: u16,
    alpha: f32,
    tiles: &TileSource<'_>,
) {
    let span_x = (right - left).max(1) as f32;
    let span_y = (bottom - top).max(1) as f32;
    for py in top.max(0)..bottom.min(viewport.height as i32) {
        let v = (py - top) as f32 / span_y;
        for px in left.max(0)..right.min(viewport.width as i32) {
            let u = (px - left) as f32 / span_x;
            let texel = tiles.texel(tile, u, v);
            let texel_alpha = alpha * f32::from(texel[3]) / 255.0;
            blend_pixel_clipped(frame, viewport, px, py, texel, texel_alpha);
        }
    }
}

fn draw_entity(frame: &mut [u8], viewport: Viewport, camera: &Camera2D, ppw: f32, entity: &Entity) {
    let color = match entity.renderable.kind {
        RenderableKind::Placeholder => PLACEHOLDER_COLOR,
        RenderableKind::Tinted(color) => color,
    };
    let (cx, cy) = world_to_screen(entity.transform.position, camera, viewport, ppw);
    let half_size = (entity.half_extent * ppw).round().max(1.0) as i32;
    for y in (cy - half_size)..(cy + half_size) {
        for x in (cx - half_size)..(cx + half_size) {
            blend_pixel_clipped(frame, viewport, x, y, color, 1.0);
        }
    }
}

fn visible_tile_rect(
    layer: &TileLayer,
    camera: &Camera2D,
    viewport: Viewport,
    ppw: f32,
) -> Option<TileRectInclusive> {
    if layer.width() == 0 || layer.height() == 0 || !(ppw > f32::EPSILON) {
        return None;
    }
    let half_w = viewport.width as f32 / (2.0 * ppw);
    let half_h = viewport.height as f32 / (2.0 * ppw);

    let x_min = ((camera.position.x - half_w).floor() as i32).max(0);
    let x_max = ((camera.position.x + half_w).ceil() as i32).min(layer.width() as i32 - 1);
    let y_min = ((camera.position.y - half_h).floor() as i32).max(0);
    let y_max = ((camera.position.y + half_h).ceil() as i32).min(layer.height() as i32 - 1);

    if x_min > x_max || y_min > y_max {
        return None;
    }
    Some(TileRectInclusive {
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

fn blend_pixel_clipped(
    frame: &mut [u8],
    viewport: Viewport,
    x: i32,
    y: i32,
    color: [u8; 4],
    alpha: f32,
) {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return;
    }
    let offset = (y as usize * viewport.width as usize + x as usize) * 4;
    if let Some(pixel) = frame.get_mut(offset..offset + 4) {
        blend_into(pixel, color, alpha);
    }
}

fn blend_into(pixel: &mut [u8], color: [u8; 4], alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    for channel in 0..3 {
        let src = f32::from(color[channel]);
        let dst = f32::from(pixel[channel]);
        pixel[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    pixel[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{RenderableDesc, Transform};

    const VIEWPORT: Viewport = Viewport {
        width: 8,
        height: 8,
    };

    fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * VIEWPORT.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn world_with_grid(grid: TileGrid) -> SceneWorld {
        let mut world = SceneWorld::default();
        world.camera_mut().position = Vec2::new(1.0, 1.0);
        world.set_tile_grid(grid);
        world
    }

    fn render(world: &SceneWorld, palette: &TilePalette) -> Vec<u8> {
        let mut frame = vec![0u8; (VIEWPORT.width * VIEWPORT.height * 4) as usize];
        let tiles = TileSource {
            atlas: None,
            palette,
        };
        draw_world(&mut frame, VIEWPORT, world, &tiles);
        frame
    }

    #[test]
    fn blend_mixes_channels_by_alpha() {
        let mut pixel = [0u8, 100, 200, 255];
        blend_into(&mut pixel, [200, 100, 0, 255], 0.5);
        assert_eq!(pixel, [100, 100, 100, 255]);
    }

    #[test]
    fn zero_alpha_blend_is_noop() {
        let mut pixel = [1u8, 2, 3, 255];
        blend_into(&mut pixel, [200, 200, 200, 255], 0.0);
        assert_eq!(pixel, [1, 2, 3, 255]);
    }

    #[test]
    fn ground_tile_uses_palette_colour() {
        let mut grid = TileGrid::new(2, 2, 4);
        grid.ground.fill(6, 0, 0, 2, 2);
        let palette = TilePalette::new([(6, [90, 60, 30, 255])]);
        let frame = render(&world_with_grid(grid), &palette);
        assert_eq!(pixel(&frame, 0, 0), [90, 60, 30, 255]);
        assert_eq!(pixel(&frame, 7, 7), [90, 60, 30, 255]);
    }

    #[test]
    fn transparent_shadow_leaves_ground_visible_and_opaque_hides_it() {
        let mut grid = TileGrid::new(2, 2, 4);
        grid.ground.fill(6, 0, 0, 2, 2);
        grid.shadow.fill(20, 0, 0, 2, 2);
        grid.shadow.set_alpha(0, 0, 1, 2, 0.0);
        let palette = TilePalette::new([(6, [90, 60, 30, 255]), (20, [0, 0, 0, 255])]);
        let frame = render(&world_with_grid(grid), &palette);

        assert_eq!(pixel(&frame, 1, 1), [90, 60, 30, 255]);
        assert_eq!(pixel(&frame, 6, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn full_fade_blacks_out_frame() {
        let mut grid = TileGrid::new(2, 2, 4);
        grid.ground.fill(6, 0, 0, 2, 2);
        let mut world = world_with_grid(grid);
        world.set_fade(1.0);
        let frame = render(&world, &TilePalette::default());
        assert!(frame.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn entity_drawn_over_ground() {
        let mut grid = TileGrid::new(2, 2, 4);
        grid.ground.fill(6, 0, 0, 2, 2);
        let mut world = world_with_grid(grid);
        world.spawn(
            Transform {
                position: Vec2::new(1.0, 1.0),
            },
            RenderableDesc {
                kind: RenderableKind::Tinted([10, 200, 10, 255]),
                debug_name: "player",
            },
            0.25,
        );
        world.apply_pending();
        let frame = render(&world, &TilePalette::default());
        assert_eq!(pixel(&frame, 4, 4), [10, 200, 10, 255]);
    }

    #[test]
    fn unknown_tile_falls_back_to_marker_colour() {
        assert_eq!(TilePalette::default().color_for(999), TILE_FALLBACK_UNKNOWN_COLOR);
    }

    #[test]
    fn visible_rect_is_clipped_to_layer() {
        let layer = TileLayer::new("Ground", 4, 4);
        let camera = Camera2D {
            position: Vec2::new(0.0, 0.0),
            ..Camera2D::default()
        };
        let rect = visible_tile_rect(&layer, &camera, VIEWPORT, 1.0).expect("rect");
        assert_eq!((rect.x_min, rect.y_min), (0, 0));
        assert_eq!((rect.x_max, rect.y_max), (3, 3));
    }
}
