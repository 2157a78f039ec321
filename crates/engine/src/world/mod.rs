mod asset;
mod grid;
mod tiles;
mod viewport;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{info, warn};

use crate::geometry::Vec2;

pub use asset::AssetError;
pub use grid::{TileGrid, BOARD_HEIGHT, BOARD_WIDTH, EMPTY_TILE, TILE_SIZE};
pub use tiles::{
    parse_tile_records, TileFlags, TileInfo, TilePropertyTable, TileRecord, DEFAULT_SPRITE_REF,
};
pub use viewport::{Viewport, GAME_VIEWPORT_HEIGHT, GAME_VIEWPORT_WIDTH};

#[cfg(test)]
pub(crate) use tiles::encode_record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleTile {
    pub tile_x: i32,
    pub tile_y: i32,
    pub tile_id: u16,
    pub sprite_ref: u16,
    pub screen_x: i32,
    pub screen_y: i32,
}

#[derive(Debug, Clone, Default)]
pub struct TileWorld {
    grid: TileGrid,
    properties: TilePropertyTable,
}

impl TileWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(grid: TileGrid, properties: TilePropertyTable) -> Self {
        Self { grid, properties }
    }

    pub fn load_grid<R: Read>(&mut self, source: R) {
        match TileGrid::read_from(source, BOARD_WIDTH, BOARD_HEIGHT) {
            Ok(grid) => {
                info!(
                    width = grid.width(),
                    height = grid.height(),
                    non_empty_tiles = grid.non_empty_count(),
                    "board_loaded"
                );
                self.grid = grid;
            }
            Err(error) => {
                warn!(error = %error, "board_load_failed_using_empty_board");
                self.grid = TileGrid::default();
            }
        }
    }

    pub fn load_grid_file(&mut self, path: &Path) {
        match File::open(path) {
            Ok(file) => self.load_grid(BufReader::new(file)),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "board_file_unavailable_using_empty_board"
                );
                self.grid = TileGrid::default();
            }
        }
    }

    pub fn load_tile_properties<R: Read>(&mut self, source: R) {
        match parse_tile_records(source) {
            Ok(records) => {
                self.properties = TilePropertyTable::from_records(&records);
                info!(records = records.len(), "tile_properties_loaded");
            }
            Err(error) => {
                warn!(error = %error, "tile_properties_load_failed_using_defaults");
                self.properties = TilePropertyTable::default();
            }
        }
    }

    pub fn load_tile_properties_file(&mut self, path: &Path) {
        match File::open(path) {
            Ok(file) => self.load_tile_properties(BufReader::new(file)),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "tile_properties_file_unavailable_using_defaults"
                );
                self.properties = TilePropertyTable::default();
            }
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn properties(&self) -> &TilePropertyTable {
        &self.properties
    }

    pub fn pixel_width(&self) -> i32 {
        self.grid.pixel_width()
    }

    pub fn pixel_height(&self) -> i32 {
        self.grid.pixel_height()
    }

    pub fn tile_at_world(&self, world_x: i32, world_y: i32) -> Option<u16> {
        if world_x < 0 || world_y < 0 {
            return None;
        }
        self.grid
            .tile_at(world_x / TILE_SIZE, world_y / TILE_SIZE)
    }

    /// Out-of-grid coordinates are solid; in-grid tiles are solid unless passable.
    pub fn is_solid(&self, world_x: i32, world_y: i32) -> bool {
        match self.tile_at_world(world_x, world_y) {
            Some(tile_id) => !self.properties.is_passable(tile_id),
            None => true,
        }
    }

    pub fn tile_flags_at(&self, world_x: i32, world_y: i32) -> TileFlags {
        self.tile_at_world(world_x, world_y)
            .map_or(TileFlags::DEFAULT, |tile_id| self.properties.flags(tile_id))
    }

    pub fn update_viewport(&self, viewport: &mut Viewport, focus: Vec2) {
        let max_x = (self.pixel_width() - viewport.width).max(0);
        let max_y = (self.pixel_height() - viewport.height).max(0);
        viewport.x = (focus.x as i32 - viewport.width / 2).clamp(0, max_x);
        viewport.y = (focus.y as i32 - viewport.height / 2).clamp(0, max_y);
    }

    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<VisibleTile> {
        let start_x = viewport.x.div_euclid(TILE_SIZE).max(0);
        let start_y = viewport.y.div_euclid(TILE_SIZE).max(0);
        let end_x = ((viewport.x + viewport.width - 1).div_euclid(TILE_SIZE) + 1)
            .min(self.grid.width() as i32);
        let end_y = ((viewport.y + viewport.height - 1).div_euclid(TILE_SIZE) + 1)
            .min(self.grid.height() as i32);

        let mut visible = Vec::new();
        for tile_y in start_y..end_y {
            for tile_x in start_x..end_x {
                let Some(tile_id) = self.grid.tile_at(tile_x, tile_y) else {
                    continue;
                };
                if tile_id == EMPTY_TILE {
                    continue;
                }
                visible.push(VisibleTile {
                    tile_x,
                    tile_y,
                    tile_id,
                    sprite_ref: self.properties.sprite_ref(tile_id),
                    screen_x: tile_x * TILE_SIZE - viewport.x,
                    screen_y: tile_y * TILE_SIZE - viewport.y,
                });
            }
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn board_bytes(tiles: &[u16]) -> Vec<u8> {
        tiles.iter().flat_map(|tile| tile.to_le_bytes()).collect()
    }

    fn passable_sky_world() -> TileWorld {
        let mut grid = TileGrid::filled(BOARD_WIDTH, BOARD_HEIGHT, 0);
        for tile_x in 0..BOARD_WIDTH as i32 {
            grid.set_tile(tile_x, 10, 1);
        }
        let properties = TilePropertyTable::from_records(&[TileRecord {
            tile_id: 0,
            sprite_ref: 0,
            flags_to_xor: TileFlags::PASSABLE_BY_ACTOR,
            name: "sky".to_string(),
        }]);
        TileWorld::from_parts(grid, properties)
    }

    #[test]
    fn out_of_bounds_coordinates_are_solid() {
        let world = passable_sky_world();
        let width = world.pixel_width();
        let height = world.pixel_height();
        for (x, y) in [
            (-1, 5),
            (5, -1),
            (width, 5),
            (5, height),
            (i32::MIN, i32::MAX),
        ] {
            assert!(world.is_solid(x, y), "({x}, {y}) should be solid");
        }
        assert!(!world.is_solid(0, 0));
        assert!(!world.is_solid(width - 1, 0));
        assert!(world.is_solid(0, 160));
    }

    #[test]
    fn default_world_is_solid_everywhere() {
        let world = TileWorld::new();
        assert!(world.is_solid(0, 0));
        assert!(world.is_solid(100, 100));
        assert!(world.visible_tiles(&Viewport::default()).is_empty());
    }

    #[test]
    fn unknown_tile_ids_use_default_flags() {
        let mut world = passable_sky_world();
        let mut grid = world.grid().clone();
        grid.set_tile(3, 3, 0x7777);
        world = TileWorld::from_parts(grid, world.properties().clone());
        assert_eq!(world.tile_flags_at(3 * 16, 3 * 16), TileFlags::DEFAULT);
        assert!(world.is_solid(3 * 16 + 8, 3 * 16 + 8));
    }

    #[test]
    fn update_viewport_centres_and_clamps() {
        let world = passable_sky_world();
        let mut viewport = Viewport::default();

        world.update_viewport(&mut viewport, Vec2::new(1000.0, 500.0));
        assert_eq!((viewport.x, viewport.y), (840, 406));

        world.update_viewport(&mut viewport, Vec2::new(10.0, 10.0));
        assert_eq!((viewport.x, viewport.y), (0, 0));

        world.update_viewport(&mut viewport, Vec2::new(1.0e6, 1.0e6));
        assert_eq!(viewport.x, world.pixel_width() - viewport.width);
        assert_eq!(viewport.y, world.pixel_height() - viewport.height);
    }

    #[test]
    fn update_viewport_is_idempotent() {
        let world = passable_sky_world();
        let focus = Vec2::new(777.5, 321.25);
        let mut first = Viewport::default();
        world.update_viewport(&mut first, focus);
        let mut second = first;
        world.update_viewport(&mut second, focus);
        assert_eq!(first, second);
    }

    #[test]
    fn oversized_viewport_pins_to_origin() {
        let world = TileWorld::from_parts(TileGrid::filled(4, 4, 0), TilePropertyTable::default());
        let mut viewport = Viewport::sized(320, 188);
        world.update_viewport(&mut viewport, Vec2::new(500.0, 500.0));
        assert_eq!((viewport.x, viewport.y), (0, 0));
    }

    #[test]
    fn visible_tiles_skip_empty_cells_and_resolve_sprites() {
        let world = passable_sky_world();
        let viewport = Viewport::new(8, 100, 320, 188);
        let visible = world.visible_tiles(&viewport);

        assert!(!visible.is_empty());
        assert!(visible.iter().all(|tile| tile.tile_id == 1 && tile.tile_y == 10));
        assert_eq!(visible[0].tile_x, 0);
        assert_eq!(visible[0].screen_x, -8);
        assert_eq!(visible[0].screen_y, 60);
        assert_eq!(visible[0].sprite_ref, DEFAULT_SPRITE_REF);
        assert_eq!(visible.len(), 21);
    }

    #[test]
    fn tile_aligned_viewport_edges_exclude_the_next_cell() {
        let mut world = passable_sky_world();
        let mut grid = world.grid().clone();
        for tile_x in 0..BOARD_WIDTH as i32 {
            grid.set_tile(tile_x, 11, 1);
        }
        world = TileWorld::from_parts(grid, world.properties().clone());

        let visible = world.visible_tiles(&Viewport::new(0, 0, 320, 176));
        assert_eq!(visible.len(), 20);
        assert!(visible.iter().all(|tile| tile.tile_y == 10));
        assert!(visible.iter().all(|tile| tile.screen_x < 320));
        assert_eq!(visible.last().map(|tile| tile.tile_x), Some(19));
    }

    #[test]
    fn load_grid_reads_exact_board_and_ignores_trailing_data() {
        let mut tiles = vec![0u16; (BOARD_WIDTH * BOARD_HEIGHT) as usize];
        tiles[BOARD_WIDTH as usize + 2] = 9;
        let mut bytes = board_bytes(&tiles);
        bytes.extend_from_slice(&[1, 2, 3, 4]);

        let mut world = TileWorld::new();
        world.load_grid(bytes.as_slice());
        assert_eq!(world.grid().tile_at(2, 1), Some(9));
        assert_eq!(world.grid().non_empty_count(), 1);
    }

    #[test]
    fn truncated_board_falls_back_to_empty_grid() {
        let mut world = passable_sky_world();
        world.load_grid(&[1u8, 0, 1, 0][..]);
        assert_eq!(world.grid(), &TileGrid::default());
        assert!(!world.is_solid(0, 160));
    }

    #[test]
    fn malformed_property_stream_keeps_default_table() {
        let mut bytes = encode_record(&TileRecord {
            tile_id: 0,
            sprite_ref: 0,
            flags_to_xor: TileFlags::PASSABLE_BY_ACTOR,
            name: String::new(),
        });
        bytes.extend_from_slice(&[5, 0, 1]);

        let mut world = TileWorld::new();
        world.load_tile_properties(bytes.as_slice());
        assert_eq!(world.properties().flags(0), TileFlags::DEFAULT);
        assert!(world.is_solid(0, 0));
    }

    #[test]
    fn file_loaders_read_from_disk_and_degrade_when_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let tiles_path = temp.path().join("tiles.xr1");
        let board_path = temp.path().join("map.xr1");

        let record = TileRecord {
            tile_id: 0,
            sprite_ref: 0x0042,
            flags_to_xor: TileFlags::PASSABLE_BY_ACTOR,
            name: "air".to_string(),
        };
        fs::write(&tiles_path, encode_record(&record)).expect("write tiles");
        let mut tiles = vec![0u16; (BOARD_WIDTH * BOARD_HEIGHT) as usize];
        tiles[0] = 4;
        fs::write(&board_path, board_bytes(&tiles)).expect("write board");

        let mut world = TileWorld::new();
        world.load_tile_properties_file(&tiles_path);
        world.load_grid_file(&board_path);
        assert_eq!(world.properties().info(0).name, "air");
        assert_eq!(world.grid().tile_at(0, 0), Some(4));
        assert!(world.is_solid(0, 0));
        assert!(!world.is_solid(16, 0));

        world.load_grid_file(&temp.path().join("missing.xr1"));
        assert_eq!(world.grid(), &TileGrid::default());
        world.load_tile_properties_file(&temp.path().join("missing.xr1"));
        assert!(world.is_solid(16, 0));
    }
}
