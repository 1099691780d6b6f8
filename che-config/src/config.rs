// Standard library imports
use std::path::PathBuf;
use std::time::Duration;

// External crate imports
use serde::{Deserialize, Serialize};
use url::Url;

// Internal imports
use crate::error::{ConfigError, Result};

/// Namespace Che runs workspace pods in for the admin user.
pub const DEFAULT_NAMESPACE: &str = "admin-che";

fn default_chectl_bin() -> String {
    "chectl".to_string()
}

fn default_kubectl_bin() -> String {
    "kubectl".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_start_timeout_ms() -> u64 {
    240_000
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_stop_settle_ms() -> u64 {
    60_000
}

/// Complete configuration for one run of the action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionConfig {
    /// Base URL of the Che server, e.g. `https://che.example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub che_url: Option<String>,

    /// Devfile the workspace is created from (URL or path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devfile_url: Option<String>,

    #[serde(default = "default_chectl_bin")]
    pub chectl_bin: String,

    #[serde(default = "default_kubectl_bin")]
    pub kubectl_bin: String,

    /// Namespace watched for running workspace pods
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub timings: TimingConfig,

    /// File the config was loaded from, if any
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            che_url: None,
            devfile_url: None,
            chectl_bin: default_chectl_bin(),
            kubectl_bin: default_kubectl_bin(),
            namespace: default_namespace(),
            timings: TimingConfig::default(),
            source_path: None,
        }
    }
}

/// Waits used by the lifecycle controller, all in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "default_start_timeout_ms")]
    pub start_timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_stop_settle_ms")]
    pub stop_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            start_timeout_ms: default_start_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            stop_settle_ms: default_stop_settle_ms(),
        }
    }
}

impl TimingConfig {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stop_settle(&self) -> Duration {
        Duration::from_millis(self.stop_settle_ms)
    }
}

impl ActionConfig {
    /// Devfile reference, required to create a workspace.
    pub fn devfile(&self) -> Result<&str> {
        self.devfile_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("devfile_url"))
    }

    /// Parsed Che server URL. Only `http` and `https` are accepted.
    pub fn che_url(&self) -> Result<Url> {
        let raw = self
            .che_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("che_url"))?;

        let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
            field: "che_url",
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid {
                field: "che_url",
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    /// Checks the settings every command depends on.
    pub fn validate(&self) -> Result<()> {
        if self.timings.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timings.poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Missing("namespace"));
        }
        for (field, bin) in [
            ("chectl_bin", &self.chectl_bin),
            ("kubectl_bin", &self.kubectl_bin),
        ] {
            if bin.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "binary name is empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_lifecycle_timings() {
        let config = ActionConfig::default();
        assert_eq!(config.namespace, "admin-che");
        assert_eq!(config.chectl_bin, "chectl");
        assert_eq!(config.timings.start_timeout(), Duration::from_secs(240));
        assert_eq!(config.timings.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.timings.stop_settle(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "devfile_url: https://example.com/devfile.yaml\ntimings:\n  poll_interval_ms: 250\n";
        let config: ActionConfig = serde_yaml_ng::from_str(yaml).expect("valid yaml");

        assert_eq!(config.devfile().ok(), Some("https://example.com/devfile.yaml"));
        assert_eq!(config.timings.poll_interval_ms, 250);
        assert_eq!(config.timings.start_timeout_ms, 240_000);
        assert_eq!(config.kubectl_bin, "kubectl");
    }

    #[test]
    fn blank_devfile_is_missing() {
        let config = ActionConfig {
            devfile_url: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.devfile(),
            Err(ConfigError::Missing("devfile_url"))
        ));
    }

    #[test]
    fn che_url_requires_http_scheme() {
        let mut config = ActionConfig {
            che_url: Some("https://che.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.che_url().map(|u| u.host_str().map(String::from)).ok(),
            Some(Some("che.example.com".to_string()))
        );

        config.che_url = Some("ftp://che.example.com".to_string());
        assert!(matches!(
            config.che_url(),
            Err(ConfigError::Invalid { field: "che_url", .. })
        ));

        config.che_url = Some("not a url".to_string());
        assert!(config.che_url().is_err());

        config.che_url = None;
        assert!(matches!(config.che_url(), Err(ConfigError::Missing("che_url"))));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = ActionConfig {
            timings: TimingConfig {
                poll_interval_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "timings.poll_interval_ms",
                ..
            })
        ));
    }
}
