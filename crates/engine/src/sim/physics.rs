use crate::world::{TileWorld, TILE_SIZE};

use super::entity::Body;

/// Largest distance moved between collision checks; half a tile so no tile can be skipped.
pub const MAX_STEP_PX: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalContact {
    None,
    Floor,
    Ceiling,
}

fn sub_steps(delta: f32, extent_px: i32) -> Option<(u32, f32)> {
    if !delta.is_finite() || delta == 0.0 {
        return None;
    }
    // Anything past the board extent is out-of-bounds solid.
    let limit = extent_px.max(TILE_SIZE) as f32;
    let delta = delta.clamp(-limit, limit);
    let count = (delta.abs() / MAX_STEP_PX).ceil().max(1.0) as u32;
    Some((count, delta / count as f32))
}

pub fn move_horizontal(body: &mut Body, world: &TileWorld, dx: f32) -> bool {
    let Some((count, step)) = sub_steps(dx, world.pixel_width()) else {
        return false;
    };
    for _ in 0..count {
        body.position.x += step;
        if resolve_horizontal(body, world, step > 0.0) {
            return true;
        }
    }
    false
}

fn resolve_horizontal(body: &mut Body, world: &TileWorld, moving_right: bool) -> bool {
    let rect = body.bounds().to_pixels();
    for y in rect.top..rect.bottom {
        if moving_right && world.is_solid(rect.right, y) {
            let boundary = (rect.right.div_euclid(TILE_SIZE) * TILE_SIZE).min(world.pixel_width());
            body.position.x = (boundary - 1) as f32 - body.size.x;
            body.velocity.x = 0.0;
            return true;
        }
        if !moving_right && world.is_solid(rect.left, y) {
            let boundary = if rect.left < 0 {
                0
            } else {
                (rect.left.div_euclid(TILE_SIZE) + 1) * TILE_SIZE
            };
            body.position.x = (boundary + 1) as f32;
            body.velocity.x = 0.0;
            return true;
        }
    }
    false
}

pub fn move_vertical(body: &mut Body, world: &TileWorld, dy: f32) -> VerticalContact {
    let Some((count, step)) = sub_steps(dy, world.pixel_height()) else {
        return VerticalContact::None;
    };
    for _ in 0..count {
        body.position.y += step;
        let contact = resolve_vertical(body, world, step > 0.0);
        if contact != VerticalContact::None {
            return contact;
        }
    }
    VerticalContact::None
}

fn resolve_vertical(body: &mut Body, world: &TileWorld, moving_down: bool) -> VerticalContact {
    let rect = body.bounds().to_pixels();
    for x in rect.left..rect.right {
        if moving_down && world.is_solid(x, rect.bottom) {
            let boundary =
                (rect.bottom.div_euclid(TILE_SIZE) * TILE_SIZE).min(world.pixel_height());
            body.position.y = (boundary - 1) as f32 - body.size.y;
            body.velocity.y = 0.0;
            return VerticalContact::Floor;
        }
        if !moving_down && world.is_solid(x, rect.top) {
            let boundary = if rect.top < 0 {
                0
            } else {
                (rect.top.div_euclid(TILE_SIZE) + 1) * TILE_SIZE
            };
            body.position.y = (boundary + 1) as f32;
            body.velocity.y = 0.0;
            return VerticalContact::Ceiling;
        }
    }
    VerticalContact::None
}

pub fn has_ground_support(body: &Body, world: &TileWorld) -> bool {
    let rect = body.bounds().to_pixels();
    (rect.left..rect.right)
        .any(|x| world.is_solid(x, rect.bottom) || world.is_solid(x, rect.bottom + 1))
}
