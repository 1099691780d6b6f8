//! Workspace lifecycle controller
//!
//! Drives one workspace through create, wait-for-running and stop:
//!
//! ```text
//! Idle -> Starting -> AwaitingUrl -> WaitingRunning -> StoppingLookup -> StoppingCommand -> Stopped
//! ```
//!
//! Any error moves the controller to `Failed` and is returned to the caller
//! unchanged. Nothing is retried.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::chectl::LifecycleCli;
use crate::cluster::{ClusterQuery, PodSelector, CHE_NAMESPACE};
use crate::error::{LifecycleError, Result};
use crate::extract::{WORKSPACE_ID, WORKSPACE_URL};
use crate::poll::{poll_until, PollOutcome, PollReport};
use crate::sink::OutputSink;

/// Name of the output carrying the started workspace's URL.
pub const WORKSPACE_URL_OUTPUT: &str = "workspace-url";

/// Default for [`WorkspaceController::pause`] when callers have no better value.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

/// What to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRequest {
    devfile: String,
}

impl LifecycleRequest {
    pub fn new(devfile: impl Into<String>) -> Self {
        Self {
            devfile: devfile.into(),
        }
    }

    pub fn devfile(&self) -> &str {
        &self.devfile
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimings {
    /// Budget for the workspace pod to reach `Running`
    pub start_timeout: Duration,
    /// Spacing between running-pod checks
    pub poll_interval: Duration,
    /// Wait after `workspace:stop` for teardown to finish
    pub stop_settle: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_millis(240_000),
            poll_interval: Duration::from_millis(5_000),
            stop_settle: Duration::from_millis(60_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Starting,
    AwaitingUrl,
    WaitingRunning,
    StoppingLookup,
    StoppingCommand,
    Stopped,
    Failed,
}

impl LifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Stopped | LifecycleState::Failed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Starting => "starting",
            LifecycleState::AwaitingUrl => "awaiting-url",
            LifecycleState::WaitingRunning => "waiting-running",
            LifecycleState::StoppingLookup => "stopping-lookup",
            LifecycleState::StoppingCommand => "stopping-command",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Values gathered by a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    pub workspace_url: String,
    pub workspace_id: String,
    pub wait: PollReport,
}

pub struct WorkspaceController {
    request: LifecycleRequest,
    cli: Arc<dyn LifecycleCli>,
    cluster: Arc<dyn ClusterQuery>,
    sink: Arc<dyn OutputSink>,
    selector: PodSelector,
    timings: LifecycleTimings,
    state: Mutex<LifecycleState>,
}

impl WorkspaceController {
    pub fn new(
        request: LifecycleRequest,
        cli: Arc<dyn LifecycleCli>,
        cluster: Arc<dyn ClusterQuery>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            request,
            cli,
            cluster,
            sink,
            selector: PodSelector::running_workspaces(CHE_NAMESPACE),
            timings: LifecycleTimings::default(),
            state: Mutex::new(LifecycleState::Idle),
        }
    }

    pub fn with_timings(mut self, timings: LifecycleTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_selector(mut self, selector: PodSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn timings(&self) -> LifecycleTimings {
        self.timings
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, next: LifecycleState) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!("workspace lifecycle: {} -> {}", *state, next);
        *state = next;
    }

    /// Moves to `Failed` when `result` is an error, then hands it back.
    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!("workspace lifecycle failed in state {}: {}", self.state(), err);
            self.transition(LifecycleState::Failed);
        }
        result
    }

    /// Creates and starts the workspace, waits for it to run, then stops it.
    ///
    /// The workspace URL is published as the `workspace-url` output as soon
    /// as it is known, so it survives a later failure.
    pub async fn start(&self) -> Result<LifecycleReport> {
        let result = self.run_sequence().await;
        self.track(result)
    }

    async fn run_sequence(&self) -> Result<LifecycleReport> {
        let workspace_url = self.create_and_start().await?;
        let wait = self
            .wait_running(self.timings.start_timeout, self.timings.poll_interval)
            .await?;
        // Stop it so that the tests using this workspace start it themselves
        let workspace_id = self.stop_last_workspace(self.timings.stop_settle).await?;

        Ok(LifecycleReport {
            workspace_url,
            workspace_id,
            wait,
        })
    }

    async fn create_and_start(&self) -> Result<String> {
        self.sink.info("Create and start workspace...");
        self.sink
            .info(&format!("DevFile Path selected to {}", self.request.devfile()));

        self.transition(LifecycleState::Starting);
        let output = self.cli.create_and_start(self.request.devfile()).await?;

        self.transition(LifecycleState::AwaitingUrl);
        let workspace_url = WORKSPACE_URL
            .extract_last(&output.stdout)
            .map_err(|e| LifecycleError::UrlExtractionFailed { output: e.text })?;

        self.sink.set_output(WORKSPACE_URL_OUTPUT, &workspace_url)?;
        self.sink
            .info(&format!("Detect as workspace URL the value {}", workspace_url));
        Ok(workspace_url)
    }

    /// Waits until at least one running workspace pod is visible.
    ///
    /// Checks every `interval` for at most `timeout / interval` attempts (at
    /// least one). Runs out with [`LifecycleError::WorkspaceStartTimeout`].
    pub async fn wait_workspace_start(
        &self,
        timeout: Duration,
        interval: Duration,
    ) -> Result<PollReport> {
        let result = self.wait_running(timeout, interval).await;
        self.track(result)
    }

    async fn wait_running(&self, timeout: Duration, interval: Duration) -> Result<PollReport> {
        self.transition(LifecycleState::WaitingRunning);

        let outcome = poll_until(interval, timeout, |attempt| async move {
            let running = self.cluster.count_pods(&self.selector).await?;
            debug!(attempt, running, "running workspace pods");
            if running > 0 {
                self.sink.info("Found a running workspace, do not wait anymore");
                Ok::<_, LifecycleError>(PollOutcome::Found)
            } else {
                self.sink.info("Waiting workspace running...");
                Ok::<_, LifecycleError>(PollOutcome::NotFound)
            }
        })
        .await;

        match outcome {
            Err(LifecycleError::PollTimeout { budget, attempts }) => {
                Err(LifecycleError::WorkspaceStartTimeout { budget, attempts })
            }
            other => other,
        }
    }

    /// Stops the last workspace listed by `workspace:list`, then waits
    /// `settle` for the teardown. Returns the stopped workspace id.
    pub async fn workspace_stop(&self, settle: Duration) -> Result<String> {
        let result = self.stop_last_workspace(settle).await;
        self.track(result)
    }

    async fn stop_last_workspace(&self, settle: Duration) -> Result<String> {
        self.transition(LifecycleState::StoppingLookup);
        let listing = self.cli.list().await?;

        let workspace_id = WORKSPACE_ID
            .extract_last(&listing.stdout)
            .map_err(|e| LifecycleError::WorkspaceIdNotFound { output: e.text })?;

        self.transition(LifecycleState::StoppingCommand);
        info!("Stopping workspace {}", workspace_id);
        self.cli.stop(&workspace_id).await?;

        self.pause(settle).await;
        self.transition(LifecycleState::Stopped);
        Ok(workspace_id)
    }

    /// Suspends the current task for `duration`.
    pub async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            debug!("pausing {:?}", duration);
            sleep(duration).await;
        }
    }
}
