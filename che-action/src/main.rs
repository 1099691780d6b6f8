// External crates
use clap::Parser;
use tracing::{debug, info};

// Internal imports
use che_core::{che_error, che_error_hint};
use che_logging::LogSettings;
use che_workspace::LifecycleError;

// Local modules
mod cli;
mod commands;

use cli::Args;
use commands::execute_command;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let guard = che_logging::init_with(LogSettings::from_env().with_debug(args.debug));

    info!(command = ?args.command, "Starting che-action");

    if let Err(e) = execute_command(args).await {
        che_error!("{:#}", e);
        if let Some(output) = e
            .downcast_ref::<LifecycleError>()
            .and_then(LifecycleError::diagnostic_output)
        {
            debug!("{}", output);
            che_error_hint!("Captured output:\n{}", output.trim_end());
        }
        drop(guard);
        std::process::exit(1);
    }
}
