use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use engine::{InputTrace, SimSnapshot, Simulation, TileWorld, Viewport};
use serde::Serialize;

pub const DEFAULT_EVERY: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    pub board: Option<PathBuf>,
    pub tiles: Option<PathBuf>,
    pub every: u64,
    pub trace_path: PathBuf,
}

impl ReplayOptions {
    pub fn new(trace_path: PathBuf) -> Self {
        Self {
            board: None,
            tiles: None,
            every: DEFAULT_EVERY,
            trace_path,
        }
    }
}

#[derive(Debug, Serialize)]
struct SnapshotLine<'a> {
    #[serde(flatten)]
    snapshot: &'a SimSnapshot,
    sounds: Vec<&'static str>,
}

pub fn parse_trace_json(raw: &str) -> Result<InputTrace, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let trace = match serde_path_to_error::deserialize::<_, InputTrace>(&mut deserializer) {
        Ok(trace) => trace,
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            return if path.is_empty() || path == "." {
                Err(format!("parse trace json: {source}"))
            } else {
                Err(format!("parse trace json at {path}: {source}"))
            };
        }
    };
    validate_trace(&trace)?;
    Ok(trace)
}

fn validate_trace(trace: &InputTrace) -> Result<(), String> {
    for (index, frame) in trace.frames.iter().enumerate() {
        if !frame.dt.is_finite() || frame.dt < 0.0 {
            return Err(expected_actual(
                &format!("frames[{index}].dt"),
                "finite non-negative seconds",
                frame.dt,
            ));
        }
    }
    Ok(())
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> String {
    format!("validation failed at {path}: expected {expected}, got {actual}")
}

pub fn load_world(options: &ReplayOptions) -> TileWorld {
    let mut world = TileWorld::new();
    if let Some(tiles) = &options.tiles {
        world.load_tile_properties_file(tiles);
    }
    if let Some(board) = &options.board {
        world.load_grid_file(board);
    }
    world
}

pub fn run<W: Write>(options: &ReplayOptions, stdout: &mut W) -> Result<(), String> {
    let raw = fs::read_to_string(&options.trace_path).map_err(|error| {
        format!(
            "failed to read trace file '{}': {error}",
            options.trace_path.display()
        )
    })?;
    let trace = parse_trace_json(&raw)?;
    let world = load_world(options);
    replay(world, &trace, options.every, stdout)
}

pub fn replay<W: Write>(
    world: TileWorld,
    trace: &InputTrace,
    every: u64,
    stdout: &mut W,
) -> Result<(), String> {
    let every = every.max(1);
    let total_ticks = trace.tick_count();
    let mut session = Simulation::new(world, Viewport::default());
    session.start();

    if total_ticks == 0 {
        return emit_snapshot(stdout, &session.snapshot(), Vec::new());
    }

    let mut sounds = Vec::new();
    for (dt, input) in trace.ticks() {
        session.step(dt, &input);
        sounds.extend(session.drain_sounds());
        let tick = session.tick_count();
        if tick % every == 0 || tick == total_ticks {
            emit_snapshot(stdout, &session.snapshot(), std::mem::take(&mut sounds))?;
        }
    }
    Ok(())
}

fn emit_snapshot<W: Write>(
    stdout: &mut W,
    snapshot: &SimSnapshot,
    sounds: Vec<&'static str>,
) -> Result<(), String> {
    let line = SnapshotLine { snapshot, sounds };
    let json = serde_json::to_string(&line)
        .map_err(|error| format!("failed to encode snapshot: {error}"))?;
    writeln!(stdout, "{json}").map_err(|error| format!("failed to write stdout: {error}"))
}
