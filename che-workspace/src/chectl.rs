//! `chectl` lifecycle commands.

use async_trait::async_trait;
use che_core::{stream_and_capture, CommandOutput, CoreError, LogObserver};
use tracing::debug;

use crate::error::Result;

/// The orchestrator commands the controller needs.
///
/// Every call resolves once the command has exited. A non-zero exit is
/// reported as [`crate::LifecycleError::CommandFailed`].
#[async_trait]
pub trait LifecycleCli: Send + Sync {
    /// `workspace:create --start --devfile=<devfile>`
    async fn create_and_start(&self, devfile: &str) -> Result<CommandOutput>;

    /// `workspace:list`
    async fn list(&self) -> Result<CommandOutput>;

    /// `workspace:stop <workspace_id>`
    async fn stop(&self, workspace_id: &str) -> Result<CommandOutput>;
}

/// Runs the real `chectl` binary, streaming its output into the log.
#[derive(Debug, Clone)]
pub struct ChectlCli {
    bin: String,
}

impl Default for ChectlCli {
    fn default() -> Self {
        Self::new("chectl")
    }
}

impl ChectlCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Arguments for each command, kept apart from execution for testing.
    fn create_args(devfile: &str) -> Vec<String> {
        vec![
            "workspace:create".to_string(),
            "--start".to_string(),
            format!("--devfile={devfile}"),
        ]
    }

    fn list_args() -> Vec<String> {
        vec!["workspace:list".to_string()]
    }

    fn stop_args(workspace_id: &str) -> Vec<String> {
        vec!["workspace:stop".to_string(), workspace_id.to_string()]
    }

    async fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        let bin = self.bin.clone();
        debug!("Running {} {}", bin, args.join(" "));

        let output = tokio::task::spawn_blocking(move || {
            let mut observer = LogObserver::with_prefix(bin.clone());
            stream_and_capture(&bin, &args, &mut observer)
        })
        .await
        .map_err(|e| CoreError::Internal(format!("chectl task did not complete: {e}")))??;

        Ok(output)
    }
}

#[async_trait]
impl LifecycleCli for ChectlCli {
    async fn create_and_start(&self, devfile: &str) -> Result<CommandOutput> {
        self.run(Self::create_args(devfile)).await
    }

    async fn list(&self) -> Result<CommandOutput> {
        self.run(Self::list_args()).await
    }

    async fn stop(&self, workspace_id: &str) -> Result<CommandOutput> {
        self.run(Self::stop_args(workspace_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines() {
        assert_eq!(
            ChectlCli::create_args("https://example.com/devfile.yaml"),
            vec![
                "workspace:create",
                "--start",
                "--devfile=https://example.com/devfile.yaml"
            ]
        );
        assert_eq!(ChectlCli::list_args(), vec!["workspace:list"]);
        assert_eq!(
            ChectlCli::stop_args("workspace89cd"),
            vec!["workspace:stop", "workspace89cd"]
        );
    }

    #[test]
    fn default_binary_is_chectl() {
        assert_eq!(ChectlCli::default().bin(), "chectl");
    }
}
