use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use replay_cli::{run, ReplayOptions};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut board = None;
    let mut tiles = None;
    let mut every = replay_cli::DEFAULT_EVERY;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--board" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --board".to_string())?;
                board = Some(PathBuf::from(value));
                index += 2;
            }
            "--tiles" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --tiles".to_string())?;
                tiles = Some(PathBuf::from(value));
                index += 2;
            }
            "--every" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --every".to_string())?;
                every = value
                    .parse::<u64>()
                    .ok()
                    .filter(|every| *every > 0)
                    .ok_or_else(|| format!("invalid --every value '{value}' (expected u64 > 0)"))?;
                index += 2;
            }
            _ => break,
        }
    }

    let trace_path = args
        .get(index)
        .ok_or_else(|| "missing trace file".to_string())?;
    if let Some(extra) = args.get(index + 1) {
        return Err(format!("unexpected argument '{extra}'"));
    }

    let mut options = ReplayOptions::new(PathBuf::from(trace_path));
    options.board = board;
    options.tiles = tiles;
    options.every = every;
    run(&options, &mut io::stdout())
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "replay_cli - deterministic headless replay of an input trace",
        "",
        "Usage:",
        "  replay_cli [--board <path>] [--tiles <path>] [--every <n>] <trace.json>",
        "",
        "Output:",
        "  one JSON snapshot per line: every n-th tick plus the final tick",
        "",
        "Defaults:",
        "  --every 1",
        "  missing --board/--tiles use the empty board and default tile table",
    ]
    .join("\n")
}
