// Command handlers

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{Args, Command};
use che_config::{ActionConfig, ConfigLoader};

pub mod factory;
pub mod lifecycle;

/// Main command dispatcher
pub async fn execute_command(args: Args) -> Result<()> {
    let mut config = ConfigLoader::new()
        .load(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(path) = &config.source_path {
        debug!("Using configuration from {}", path.display());
    }

    match args.command {
        Command::Start {
            devfile,
            start_timeout_ms,
            poll_interval_ms,
            settle_ms,
        } => {
            if devfile.is_some() {
                config.devfile_url = devfile;
            }
            override_ms(&mut config.timings.start_timeout_ms, start_timeout_ms);
            override_ms(&mut config.timings.poll_interval_ms, poll_interval_ms);
            override_ms(&mut config.timings.stop_settle_ms, settle_ms);
            lifecycle::handle_start(&config).await
        }
        Command::Wait {
            timeout_ms,
            interval_ms,
        } => {
            override_ms(&mut config.timings.start_timeout_ms, timeout_ms);
            override_ms(&mut config.timings.poll_interval_ms, interval_ms);
            lifecycle::handle_wait(&config).await
        }
        Command::Stop { settle_ms } => {
            override_ms(&mut config.timings.stop_settle_ms, settle_ms);
            lifecycle::handle_stop(&config).await
        }
        Command::ResolveFactory { repo_url, che_url } => {
            if che_url.is_some() {
                config.che_url = che_url;
            }
            factory::handle_resolve(&config, &repo_url).await
        }
    }
}

fn override_ms(target: &mut u64, value: Option<u64>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Validation shared by every command.
pub(crate) fn validate(config: &ActionConfig) -> Result<()> {
    config.validate().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_only_when_given() {
        let mut value = 5_000;
        override_ms(&mut value, None);
        assert_eq!(value, 5_000);
        override_ms(&mut value, Some(250));
        assert_eq!(value, 250);
    }
}
