use std::io::Read;

use super::asset::{read_exact_or_truncated, AssetError};

pub const BOARD_WIDTH: u32 = 256;
pub const BOARD_HEIGHT: u32 = 128;
pub const TILE_SIZE: i32 = 16;
pub const EMPTY_TILE: u16 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<u16>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::filled(BOARD_WIDTH, BOARD_HEIGHT, EMPTY_TILE)
    }
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tiles: Vec<u16>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(AssetError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn filled(width: u32, height: u32, tile_id: u16) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile_id; width as usize * height as usize],
        }
    }

    /// Reads exactly `width * height` little-endian u16 ids. Trailing bytes are left unread.
    pub fn read_from<R: Read>(mut reader: R, width: u32, height: u32) -> Result<Self, AssetError> {
        let mut bytes = vec![0u8; width as usize * height as usize * 2];
        read_exact_or_truncated(&mut reader, &mut bytes)?;
        let tiles = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(width, height, tiles)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_width(&self) -> i32 {
        self.width as i32 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> i32 {
        self.height as i32 * TILE_SIZE
    }

    fn index_of(&self, tile_x: i32, tile_y: i32) -> Option<usize> {
        if tile_x < 0 || tile_y < 0 {
            return None;
        }
        let (x, y) = (tile_x as u32, tile_y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, tile_x: i32, tile_y: i32) -> Option<u16> {
        self.index_of(tile_x, tile_y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn set_tile(&mut self, tile_x: i32, tile_y: i32, tile_id: u16) -> bool {
        let Some(index) = self.index_of(tile_x, tile_y) else {
            return false;
        };
        match self.tiles.get_mut(index) {
            Some(slot) => {
                *slot = tile_id;
                true
            }
            None => false,
        }
    }

    pub fn non_empty_count(&self) -> usize {
        self.tiles.iter().filter(|&&id| id != EMPTY_TILE).count()
    }
}
