use crate::world::{
    TileFlags, TileGrid, TilePropertyTable, TileRecord, TileWorld, BOARD_HEIGHT, BOARD_WIDTH,
};

pub(crate) const SKY: u16 = 0;
pub(crate) const ROCK: u16 = 1;
pub(crate) const GROUND_ROW: i32 = 10;
pub(crate) const GROUND_TOP: i32 = GROUND_ROW * 16;
/// Player y when resting on the ground row.
pub(crate) const STANDING_Y: f32 = (GROUND_TOP - 1 - 42) as f32;

pub(crate) fn open_world() -> TileWorld {
    world_with(|_| {})
}

pub(crate) fn world_with(edit: impl FnOnce(&mut TileGrid)) -> TileWorld {
    let mut grid = TileGrid::filled(BOARD_WIDTH, BOARD_HEIGHT, SKY);
    for tile_x in 0..BOARD_WIDTH as i32 {
        grid.set_tile(tile_x, GROUND_ROW, ROCK);
    }
    edit(&mut grid);
    let properties = TilePropertyTable::from_records(&[TileRecord {
        tile_id: SKY,
        sprite_ref: 0,
        flags_to_xor: TileFlags::PASSABLE_BY_ACTOR,
        name: "sky".to_string(),
    }]);
    TileWorld::from_parts(grid, properties)
}
