use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

pub const GAME_VIEWPORT_WIDTH: i32 = 320;
pub const GAME_VIEWPORT_HEIGHT: i32 = 188;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::sized(GAME_VIEWPORT_WIDTH, GAME_VIEWPORT_HEIGHT)
    }
}

impl Viewport {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}
