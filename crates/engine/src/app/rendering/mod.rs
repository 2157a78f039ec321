mod renderer;
mod sprites;
mod transform;

pub use renderer::Renderer;
pub use transform::{world_to_screen_px, ScreenRect};

pub const SCREEN_WIDTH: u32 = 320;
pub const SCREEN_HEIGHT: u32 = 200;
pub const STATUS_BAR_HEIGHT: u32 = 12;
