mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    world_to_screen_px, Renderer, ScreenRect, SCREEN_HEIGHT, SCREEN_WIDTH, STATUS_BAR_HEIGHT,
};
pub use scene::{HudState, Scene, SceneCommand, SceneView};
