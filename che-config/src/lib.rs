//! Configuration for the Che workspace lifecycle action.
//!
//! The action reads a small YAML file (optional), then layers environment
//! variables on top. GitHub Actions inputs arrive as `INPUT_*` variables and
//! are honoured too.

pub mod config;
pub mod error;
pub mod loader;

pub use config::{ActionConfig, TimingConfig, DEFAULT_NAMESPACE};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};
