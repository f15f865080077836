use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageReader};
use thiserror::Error;

/// Where the tileset image lives and how its cells are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetConfig {
    pub path: PathBuf,
    pub tile_size_px: u32,
    pub margin_px: u32,
    pub spacing_px: u32,
}

#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("failed to open tileset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode tileset {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("tileset {path} ({width}x{height}) holds no {tile_size_px}px tiles")]
    NoTiles {
        path: PathBuf,
        width: u32,
        height: u32,
        tile_size_px: u32,
    },
}

/// A decoded tileset image, indexed left-to-right then top-to-bottom.
#[derive(Debug, Clone)]
pub struct TilesetAtlas {
    width: u32,
    rgba: Vec<u8>,
    tile_size_px: u32,
    margin_px: u32,
    spacing_px: u32,
    columns: u32,
    rows: u32,
}

impl TilesetAtlas {
    pub fn load(config: &TilesetConfig) -> Result<Self, TilesetError> {
        let path = config.path.as_path();
        let image = ImageReader::open(path)
            .map_err(|source| TilesetError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|source| TilesetError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Self::from_rgba(
            width,
            height,
            image.into_raw(),
            config.tile_size_px,
            config.margin_px,
            config.spacing_px,
        )
        .ok_or_else(|| no_tiles(path, width, height, config.tile_size_px))
    }

    pub fn from_rgba(
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        tile_size_px: u32,
        margin_px: u32,
        spacing_px: u32,
    ) -> Option<Self> {
        if tile_size_px == 0 || rgba.len() < width as usize * height as usize * 4 {
            return None;
        }
        let columns = cells_along(width, tile_size_px, margin_px, spacing_px);
        let rows = cells_along(height, tile_size_px, margin_px, spacing_px);
        if columns == 0 || rows == 0 {
            return None;
        }
        Some(Self {
            width,
            rgba,
            tile_size_px,
            margin_px,
            spacing_px,
            columns,
            rows,
        })
    }

    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Top-left pixel of tile `index` inside the image.
    pub fn tile_origin(&self, index: u16) -> Option<(u32, u32)> {
        let index = u32::from(index);
        if index >= self.tile_count() {
            return None;
        }
        let stride = self.tile_size_px + self.spacing_px;
        let column = index % self.columns;
        let row = index / self.columns;
        Some((
            self.margin_px + column * stride,
            self.margin_px + row * stride,
        ))
    }

    /// Texel of tile `index` at normalized `(u, v)` within the tile.
    pub fn sample(&self, index: u16, u: f32, v: f32) -> Option<[u8; 4]> {
        let (origin_x, origin_y) = self.tile_origin(index)?;
        let last = self.tile_size_px - 1;
        let tx = ((u.clamp(0.0, 1.0) * self.tile_size_px as f32) as u32).min(last);
        let ty = ((v.clamp(0.0, 1.0) * self.tile_size_px as f32) as u32).min(last);
        let offset = ((origin_y + ty) as usize * self.width as usize + (origin_x + tx) as usize) * 4;
        let texel = self.rgba.get(offset..offset + 4)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }
}

fn cells_along(extent: u32, tile: u32, margin: u32, spacing: u32) -> u32 {
    let usable = extent.saturating_sub(margin.saturating_mul(2));
    if usable < tile {
        return 0;
    }
    (usable - tile) / (tile + spacing) + 1
}

fn no_tiles(path: &Path, width: u32, height: u32, tile_size_px: u32) -> TilesetError {
    TilesetError::NoTiles {
        path: path.to_path_buf(),
        width,
        height,
        tile_size_px,
    }
}
