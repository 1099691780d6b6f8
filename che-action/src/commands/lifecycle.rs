//! `start`, `wait` and `stop` command handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use che_config::{ActionConfig, TimingConfig};
use che_core::command_stream::require_tool;
use che_core::{che_progress, che_success};
use che_workspace::{
    ChectlCli, GithubActionsSink, KubectlCluster, LifecycleRequest, LifecycleTimings,
    PodSelector, WorkspaceController,
};

use super::validate;

pub(crate) fn lifecycle_timings(timings: &TimingConfig) -> LifecycleTimings {
    LifecycleTimings {
        start_timeout: timings.start_timeout(),
        poll_interval: timings.poll_interval(),
        stop_settle: timings.stop_settle(),
    }
}

fn build_controller(config: &ActionConfig, request: LifecycleRequest) -> Result<WorkspaceController> {
    require_tool(&config.chectl_bin).context("chectl is required to manage workspaces")?;
    require_tool(&config.kubectl_bin).context("kubectl is required to watch workspace pods")?;

    debug!(
        "chectl={} kubectl={} namespace={}",
        config.chectl_bin, config.kubectl_bin, config.namespace
    );

    Ok(WorkspaceController::new(
        request,
        Arc::new(ChectlCli::new(config.chectl_bin.clone())),
        Arc::new(KubectlCluster::new(config.kubectl_bin.clone())),
        Arc::new(GithubActionsSink::from_env()),
    )
    .with_selector(PodSelector::running_workspaces(config.namespace.clone()))
    .with_timings(lifecycle_timings(&config.timings)))
}

/// Request for commands that do not create anything.
fn passive_request(config: &ActionConfig) -> LifecycleRequest {
    LifecycleRequest::new(config.devfile_url.clone().unwrap_or_default())
}

pub async fn handle_start(config: &ActionConfig) -> Result<()> {
    validate(config)?;
    let devfile = config.devfile().context("Cannot create a workspace")?;
    let controller = build_controller(config, LifecycleRequest::new(devfile))?;

    che_progress!("Starting workspace from {}", devfile);
    let report = controller.start().await?;

    che_success!(
        "Workspace {} was running at {} and has been stopped",
        report.workspace_id,
        report.workspace_url
    );
    Ok(())
}

pub async fn handle_wait(config: &ActionConfig) -> Result<()> {
    validate(config)?;
    let controller = build_controller(config, passive_request(config))?;
    let timings = controller.timings();

    che_progress!(
        "Waiting up to {:?} for a running workspace in {}",
        timings.start_timeout,
        config.namespace
    );
    let report = controller
        .wait_workspace_start(timings.start_timeout, timings.poll_interval)
        .await?;

    che_success!(
        "Workspace running after {} check(s) ({:?})",
        report.attempts,
        report.elapsed
    );
    Ok(())
}

pub async fn handle_stop(config: &ActionConfig) -> Result<()> {
    validate(config)?;
    let controller = build_controller(config, passive_request(config))?;

    let workspace_id = controller
        .workspace_stop(controller.timings().stop_settle)
        .await?;

    che_success!("Workspace {} stopped", workspace_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timings_convert_from_config() {
        let timings = lifecycle_timings(&TimingConfig {
            start_timeout_ms: 1_000,
            poll_interval_ms: 100,
            stop_settle_ms: 0,
        });
        assert_eq!(timings.start_timeout, Duration::from_secs(1));
        assert_eq!(timings.poll_interval, Duration::from_millis(100));
        assert_eq!(timings.stop_settle, Duration::ZERO);
    }

    #[test]
    fn default_config_matches_controller_defaults() {
        assert_eq!(
            lifecycle_timings(&TimingConfig::default()),
            LifecycleTimings::default()
        );
    }

    #[test]
    fn passive_request_tolerates_missing_devfile() {
        assert_eq!(passive_request(&ActionConfig::default()).devfile(), "");
    }
}
