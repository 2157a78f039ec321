use std::env;

use engine::{LoopConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::flow::GameFlowScene;

pub(crate) const BOARD_ENV_VAR: &str = "XARGON_BOARD";
pub(crate) const DEFAULT_BOARD_FILE: &str = "map.xr1";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Xargon Startup ===");

    let board_file = resolve_board_file(env::var(BOARD_ENV_VAR));
    info!(board_file = board_file.as_str(), "board_selected");

    AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(GameFlowScene::new(board_file)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn resolve_board_file(value: Result<String, env::VarError>) -> String {
    match value {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        Ok(_) => {
            warn!(
                env_var = BOARD_ENV_VAR,
                "empty board env var value; falling back to default"
            );
            DEFAULT_BOARD_FILE.to_string()
        }
        Err(env::VarError::NotPresent) => DEFAULT_BOARD_FILE.to_string(),
        Err(err) => {
            warn!(
                env_var = BOARD_ENV_VAR,
                error = %err,
                "unable to read board env var; falling back to default"
            );
            DEFAULT_BOARD_FILE.to_string()
        }
    }
}
