mod app;

use std::process::ExitCode;

fn main() -> ExitCode {
    let wiring = app::build_app();
    app::run(wiring)
}
