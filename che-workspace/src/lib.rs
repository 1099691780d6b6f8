//! Workspace lifecycle orchestration
//!
//! Creates a Che workspace from a devfile, waits for its pod to run, then
//! stops it again. The orchestrator CLI, the cluster and the host reporting
//! channel are reached through the traits in [`chectl`], [`cluster`] and
//! [`sink`], so the controller can be driven by test doubles.

pub mod chectl;
pub mod cluster;
pub mod controller;
pub mod error;
pub mod extract;
pub mod factory;
pub mod poll;
pub mod sink;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use chectl::{ChectlCli, LifecycleCli};
pub use cluster::{ClusterQuery, KubectlCluster, PodSelector};
pub use controller::{
    LifecycleReport, LifecycleRequest, LifecycleState, LifecycleTimings, WorkspaceController,
    DEFAULT_PAUSE, WORKSPACE_URL_OUTPUT,
};
pub use error::{LifecycleError, Result};
pub use extract::{ExtractionFailed, FieldPattern, WORKSPACE_ID, WORKSPACE_URL};
pub use factory::FactoryClient;
pub use poll::{poll_until, PollOutcome, PollReport};
pub use sink::{GithubActionsSink, OutputSink, TracingSink};
