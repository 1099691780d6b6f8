use std::time::Duration;

use che_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LifecycleError>;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Unable to find workspace URL in stdout of workspace:create process. Found:\n{output}")]
    UrlExtractionFailed { output: String },

    #[error("Unable to stop the workspace: no workspaceId found in workspace:list output:\n{output}")]
    WorkspaceIdNotFound { output: String },

    #[error(
        "Waiting too long to have workspace running: no running workspace pod after {attempts} checks over {budget:?}"
    )]
    WorkspaceStartTimeout { budget: Duration, attempts: u32 },

    #[error("Condition not met within {budget:?} after {attempts} attempts")]
    PollTimeout { budget: Duration, attempts: u32 },

    #[error("Command failed with exit code {code:?}: {command}\n\nOutput:\n{output}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Cluster query failed: {0}")]
    ClusterQuery(String),

    #[error("Che API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to publish output '{name}': {source}")]
    Output {
        name: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for LifecycleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Command {
                command,
                code,
                output,
            } => LifecycleError::CommandFailed {
                command,
                code,
                output,
            },
            other => LifecycleError::Core(other),
        }
    }
}

impl LifecycleError {
    /// Raw text captured from the external system, when there is any.
    pub fn diagnostic_output(&self) -> Option<&str> {
        match self {
            LifecycleError::UrlExtractionFailed { output }
            | LifecycleError::WorkspaceIdNotFound { output }
            | LifecycleError::CommandFailed { output, .. } => Some(output),
            LifecycleError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}
