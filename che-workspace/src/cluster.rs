//! Running-pod queries against the cluster.

use async_trait::async_trait;
use che_core::CoreError;
use duct::cmd;
use serde::Deserialize;
use tracing::debug;

use crate::error::{LifecycleError, Result};

/// Namespace Che runs the admin user's workspace pods in.
pub const CHE_NAMESPACE: &str = "admin-che";

/// Label Che sets on every workspace pod.
pub const WORKSPACE_ID_LABEL: &str = "che.workspace_id";

/// Field selector for pods in the `Running` phase.
pub const RUNNING_PHASE: &str = "status.phase=Running";

/// Which pods to count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSelector {
    pub namespace: String,
    pub field_selector: String,
    pub label_selector: String,
}

impl PodSelector {
    /// Running pods carrying a workspace id label in `namespace`.
    pub fn running_workspaces(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            field_selector: RUNNING_PHASE.to_string(),
            label_selector: WORKSPACE_ID_LABEL.to_string(),
        }
    }
}

#[async_trait]
pub trait ClusterQuery: Send + Sync {
    /// Number of pods matching `selector` right now.
    async fn count_pods(&self, selector: &PodSelector) -> Result<usize>;
}

/// Queries the cluster through `kubectl get pods -o json`.
///
/// Authentication is whatever the ambient kubeconfig provides.
#[derive(Debug, Clone)]
pub struct KubectlCluster {
    bin: String,
}

impl Default for KubectlCluster {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

#[derive(Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl KubectlCluster {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn args(selector: &PodSelector) -> Vec<String> {
        vec![
            "get".to_string(),
            "pods".to_string(),
            "--namespace".to_string(),
            selector.namespace.clone(),
            "--field-selector".to_string(),
            selector.field_selector.clone(),
            "--selector".to_string(),
            selector.label_selector.clone(),
            "--output".to_string(),
            "json".to_string(),
        ]
    }

    /// Counts `items` in a `kubectl ... -o json` list document.
    pub fn count_items(json: &str) -> Result<usize> {
        let list: PodList = serde_json::from_str(json).map_err(|e| {
            LifecycleError::ClusterQuery(format!("unexpected kubectl output ({e}):\n{json}"))
        })?;
        Ok(list.items.len())
    }
}

#[async_trait]
impl ClusterQuery for KubectlCluster {
    async fn count_pods(&self, selector: &PodSelector) -> Result<usize> {
        let bin = self.bin.clone();
        let args = Self::args(selector);
        debug!("Running {} {}", bin, args.join(" "));

        let output = tokio::task::spawn_blocking(move || {
            cmd(bin.as_str(), &args)
                .stdout_capture()
                .stderr_capture()
                .unchecked()
                .run()
                .map_err(|source| CoreError::Spawn {
                    command: bin.clone(),
                    source,
                })
        })
        .await
        .map_err(|e| CoreError::Internal(format!("kubectl task did not complete: {e}")))??;

        if !output.status.success() {
            return Err(LifecycleError::ClusterQuery(format!(
                "kubectl exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Self::count_items(&String::from_utf8_lossy(&output.stdout))
    }
}
