use thiserror::Error;

use crate::math::Vec2;

/// Tile id meaning "nothing here".
pub const EMPTY_TILE: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

/// Read-only grid of tile ids, consumed once at map-load time. Rows run
/// top-to-bottom (y-down), matching world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    origin: Vec2,
    tile_size: f32,
    tiles: Vec<u16>,
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        origin: Vec2,
        tile_size: f32,
        tiles: Vec<u16>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            origin,
            tile_size,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u16> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// World position of tile (x,y)'s top-left corner.
    pub fn tile_origin_world(&self, x: u32, y: u32) -> Option<Vec2> {
        self.index_of(x, y)?;
        Some(Vec2 {
            x: self.origin.x + x as f32 * self.tile_size,
            y: self.origin.y + y as f32 * self.tile_size,
        })
    }

    /// Grid-snaps an arbitrary world position to the origin of the cell that
    /// contains it.
    pub fn snap_to_cell_origin(&self, position: Vec2) -> Vec2 {
        let cell_x = ((position.x - self.origin.x) / self.tile_size).floor();
        let cell_y = ((position.y - self.origin.y) / self.tile_size).floor();
        Vec2 {
            x: self.origin.x + cell_x * self.tile_size,
            y: self.origin.y + cell_y * self.tile_size,
        }
    }
}
