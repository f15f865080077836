mod app;
mod config;
mod decorate;
mod dungeon;
mod level;
mod player;
mod progression;
mod scene;
mod tiles;
mod visibility;

use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let app = match app::bootstrap::build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    app::loop_runner::run(app)
}
