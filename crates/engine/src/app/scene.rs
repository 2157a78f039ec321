use crate::sim::Drawable;
use crate::world::{TileWorld, Viewport};
use crate::AppPaths;

use super::input::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudState {
    pub health: u32,
    pub max_health: u32,
}

#[derive(Debug)]
pub enum SceneView<'a> {
    Blank,
    Title {
        elapsed_seconds: f32,
    },
    Playing {
        world: &'a TileWorld,
        viewport: Viewport,
        drawables: Vec<Drawable>,
        hud: HudState,
    },
}

pub trait Scene {
    fn load(&mut self, paths: &AppPaths);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn view(&self) -> SceneView<'_>;
    fn unload(&mut self);
    fn entity_count(&self) -> usize {
        0
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneHost {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneHost {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self, paths: &AppPaths) {
        if self.is_loaded {
            return;
        }
        self.scene.load(paths);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input)
    }

    pub(crate) fn view(&self) -> SceneView<'_> {
        if !self.is_loaded {
            return SceneView::Blank;
        }
        self.scene.view()
    }

    pub(crate) fn entity_count(&self) -> usize {
        self.scene.entity_count()
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}
