// Standard library imports
use std::fs;
use std::path::{Path, PathBuf};

// External crate imports
use tracing::debug;

// Internal imports
use crate::config::ActionConfig;
use crate::error::{ConfigError, Result};

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "che-action.yaml";

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Finds, parses and overlays the action configuration.
///
/// Priority, lowest first:
/// 1. Built-in defaults
/// 2. The explicit file, or `che-action.yaml` in the working directory
/// 3. GitHub Actions inputs (`INPUT_CHE_URL`, `INPUT_DEVFILE_URL`)
/// 4. Plain environment variables (`CHE_URL`, `CHE_DEVFILE_URL`, `CHE_NAMESPACE`)
pub struct ConfigLoader {
    env: EnvLookup,
    search_dir: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader backed by the process environment.
    pub fn new() -> Self {
        Self {
            env: Box::new(|key| std::env::var(key).ok()),
            search_dir: None,
        }
    }

    /// Replaces the environment with a custom lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Looks for the default file in `dir` instead of the working directory.
    pub fn search_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    pub fn load(&self, explicit: Option<&Path>) -> Result<ActionConfig> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                self.load_file(path)?
            }
            None => {
                let candidate = match &self.search_dir {
                    Some(dir) => dir.join(DEFAULT_CONFIG_FILE),
                    None => PathBuf::from(DEFAULT_CONFIG_FILE),
                };
                if candidate.exists() {
                    self.load_file(&candidate)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    ActionConfig::default()
                }
            }
        };

        self.apply_env(&mut config);
        Ok(config)
    }

    fn load_file(&self, path: &Path) -> Result<ActionConfig> {
        debug!("Loading config from: {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: ActionConfig = if contents.trim().is_empty() {
            ActionConfig::default()
        } else {
            serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|v| !v.trim().is_empty())
    }

    fn apply_env(&self, config: &mut ActionConfig) {
        for (field, keys) in [
            (&mut config.che_url, ["INPUT_CHE_URL", "CHE_URL"]),
            (&mut config.devfile_url, ["INPUT_DEVFILE_URL", "CHE_DEVFILE_URL"]),
        ] {
            for key in keys {
                if let Some(value) = self.lookup(key) {
                    debug!("Config override from {}", key);
                    *field = Some(value);
                }
            }
        }

        if let Some(namespace) = self.lookup("CHE_NAMESPACE") {
            config.namespace = namespace;
        }
    }
}
