use std::process::ExitCode;

use ninja_engine::run_headless;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    match run_headless(&mut app.world, app.input.as_mut(), &app.config) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                deaths = summary.deaths,
                final_level = summary.final_level,
                "run_complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}
