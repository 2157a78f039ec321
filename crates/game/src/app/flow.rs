use engine::sim::{SoundSink, STARTING_HEALTH};
use engine::{
    AppPaths, HudState, InputAction, InputSnapshot, Scene, SceneCommand, SceneView, Simulation,
    TileWorld, Viewport,
};
use tracing::{debug, info};

use super::bootstrap::DEFAULT_BOARD_FILE;

pub(crate) const TILES_FILE: &str = "tiles.xr1";

#[derive(Debug, Default)]
pub(crate) struct AudioLog {
    played: u64,
}

impl SoundSink for AudioLog {
    fn play_sound(&mut self, name: &'static str) {
        self.played = self.played.saturating_add(1);
        debug!(sound = name, "sound_played");
    }
}

#[derive(Debug)]
enum FlowState {
    Initializing,
    Title { elapsed_seconds: f32 },
    Playing(Box<Simulation>),
}

#[derive(Debug)]
pub(crate) struct GameFlowScene {
    board_file: String,
    world: TileWorld,
    state: FlowState,
    audio: AudioLog,
}

impl GameFlowScene {
    pub(crate) fn new(board_file: String) -> Self {
        Self {
            board_file,
            world: TileWorld::new(),
            state: FlowState::Initializing,
            audio: AudioLog::default(),
        }
    }

    fn show_title(&mut self) {
        self.state = FlowState::Title {
            elapsed_seconds: 0.0,
        };
        info!("title_screen");
    }

    fn start_level(&mut self) {
        let mut session = Simulation::new(self.world.clone(), Viewport::default());
        session.start();
        info!(
            board_file = self.board_file.as_str(),
            entity_count = session.registry().len(),
            "level_started"
        );
        self.state = FlowState::Playing(Box::new(session));
    }
}

impl Default for GameFlowScene {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_FILE.to_string())
    }
}

impl Scene for GameFlowScene {
    fn load(&mut self, paths: &AppPaths) {
        let mut world = TileWorld::new();
        world.load_tile_properties_file(&paths.assets_dir.join(TILES_FILE));
        world.load_grid_file(&paths.assets_dir.join(&self.board_file));
        self.world = world;
        self.show_title();
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        match &mut self.state {
            FlowState::Initializing => self.show_title(),
            FlowState::Title { elapsed_seconds } => {
                *elapsed_seconds += fixed_dt_seconds;
                if input.was_pressed(InputAction::Jump) {
                    self.start_level();
                } else if input.was_pressed(InputAction::Pause) {
                    info!(reason = "title_escape", "quit_requested");
                    return SceneCommand::Quit;
                }
            }
            FlowState::Playing(session) => {
                session.step(fixed_dt_seconds, input);
                for sound in session.drain_sounds() {
                    self.audio.play_sound(sound);
                }
                if input.was_pressed(InputAction::Pause) {
                    info!(
                        tick = session.tick_count(),
                        sounds_played = self.audio.played,
                        "level_left"
                    );
                    self.show_title();
                }
            }
        }
        SceneCommand::None
    }

    fn view(&self) -> SceneView<'_> {
        match &self.state {
            FlowState::Initializing => SceneView::Blank,
            FlowState::Title { elapsed_seconds } => SceneView::Title {
                elapsed_seconds: *elapsed_seconds,
            },
            FlowState::Playing(session) => SceneView::Playing {
                world: session.world(),
                viewport: *session.viewport(),
                drawables: session.registry().drawables(),
                hud: HudState {
                    health: session.registry().player().map_or(0, |player| player.health()),
                    max_health: STARTING_HEALTH,
                },
            },
        }
    }

    fn unload(&mut self) {
        if let FlowState::Playing(session) = &self.state {
            info!(tick = session.tick_count(), "level_unloaded");
        }
        self.state = FlowState::Initializing;
    }

    fn entity_count(&self) -> usize {
        match &self.state {
            FlowState::Playing(session) => session.registry().len(),
            _ => 0,
        }
    }

    fn debug_title(&self) -> Option<String> {
        let FlowState::Playing(session) = &self.state else {
            return None;
        };
        let player = session.registry().player()?;
        Some(format!(
            "Xargon | {:?} | hp {}",
            player.state(),
            player.health()
        ))
    }
}

#[cfg(test)]
mod tests {
    use engine::PlayerState;

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn loaded_scene() -> (tempfile::TempDir, GameFlowScene) {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut scene = GameFlowScene::default();
        scene.load(&AppPaths::from_root(temp.path().to_path_buf()));
        (temp, scene)
    }

    fn pressed(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(action, true)
    }

    fn session_ticks(scene: &GameFlowScene) -> Option<u64> {
        match &scene.state {
            FlowState::Playing(session) => Some(session.tick_count()),
            _ => None,
        }
    }

    #[test]
    fn starts_blank_until_loaded() {
        let scene = GameFlowScene::default();
        assert!(matches!(scene.view(), SceneView::Blank));
        assert_eq!(scene.debug_title(), None);
    }

    #[test]
    fn initializing_moves_to_title_on_first_update() {
        let mut scene = GameFlowScene::default();
        assert_eq!(scene.update(DT, &InputSnapshot::empty()), SceneCommand::None);
        assert!(matches!(scene.view(), SceneView::Title { .. }));
    }

    #[test]
    fn load_with_missing_assets_shows_title() {
        let (_temp, mut scene) = loaded_scene();
        assert!(matches!(
            scene.view(),
            SceneView::Title {
                elapsed_seconds
            } if elapsed_seconds == 0.0
        ));

        scene.update(DT, &InputSnapshot::empty());
        let SceneView::Title { elapsed_seconds } = scene.view() else {
            panic!("expected title view");
        };
        assert!((elapsed_seconds - DT).abs() < 1e-6);
    }

    #[test]
    fn jump_on_title_starts_a_level() {
        let (_temp, mut scene) = loaded_scene();
        assert_eq!(scene.update(DT, &pressed(InputAction::Jump)), SceneCommand::None);
        assert_eq!(scene.entity_count(), 1);
        assert_eq!(session_ticks(&scene), Some(0));

        let SceneView::Playing { hud, viewport, .. } = scene.view() else {
            panic!("expected playing view");
        };
        assert_eq!(
            hud,
            HudState {
                health: STARTING_HEALTH,
                max_health: STARTING_HEALTH,
            }
        );
        assert_eq!(viewport.width, 320);
        assert_eq!(viewport.height, 188);

        let title = scene.debug_title().expect("title");
        assert!(title.contains(&format!("{:?}", PlayerState::Begin)));
    }

    #[test]
    fn playing_steps_the_simulation_and_draws_the_player() {
        let (_temp, mut scene) = loaded_scene();
        scene.update(DT, &pressed(InputAction::Jump));
        scene.update(DT, &InputSnapshot::empty());
        scene.update(DT, &InputSnapshot::empty());

        assert_eq!(session_ticks(&scene), Some(2));
        let SceneView::Playing { drawables, .. } = scene.view() else {
            panic!("expected playing view");
        };
        assert_eq!(drawables.len(), 1);
    }

    #[test]
    fn pause_on_title_quits() {
        let (_temp, mut scene) = loaded_scene();
        assert_eq!(
            scene.update(DT, &pressed(InputAction::Pause)),
            SceneCommand::Quit
        );
    }

    #[test]
    fn pause_while_playing_returns_to_title_and_next_start_is_fresh() {
        let (_temp, mut scene) = loaded_scene();
        scene.update(DT, &pressed(InputAction::Jump));
        for _ in 0..10 {
            scene.update(DT, &InputSnapshot::empty());
        }
        assert_eq!(session_ticks(&scene), Some(10));

        assert_eq!(scene.update(DT, &pressed(InputAction::Pause)), SceneCommand::None);
        assert!(matches!(scene.view(), SceneView::Title { .. }));
        assert_eq!(scene.entity_count(), 0);

        scene.update(DT, &pressed(InputAction::Jump));
        assert_eq!(session_ticks(&scene), Some(0));
    }

    #[test]
    fn quit_request_ends_any_state() {
        let (_temp, mut scene) = loaded_scene();
        let quit = InputSnapshot::empty().with_quit_requested(true);
        assert_eq!(scene.update(DT, &quit), SceneCommand::Quit);

        scene.update(DT, &pressed(InputAction::Jump));
        assert_eq!(scene.update(DT, &quit), SceneCommand::Quit);
    }

    #[test]
    fn unload_drops_the_session() {
        let (_temp, mut scene) = loaded_scene();
        scene.update(DT, &pressed(InputAction::Jump));
        scene.unload();
        assert!(matches!(scene.view(), SceneView::Blank));
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn audio_log_counts_sounds() {
        let mut audio = AudioLog::default();
        audio.play_sound("jump");
        audio.play_sound("ouch");
        assert_eq!(audio.played, 2);
    }
}
