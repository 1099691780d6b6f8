//! Where progress lines and named outputs are reported.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use che_core::che_println;
use tracing::{debug, info};

use crate::error::{LifecycleError, Result};

/// Host reporting channel for a lifecycle run.
pub trait OutputSink: Send + Sync {
    /// An informational progress line.
    fn info(&self, message: &str);

    /// Publishes a named result value, e.g. `workspace-url`.
    fn set_output(&self, name: &str, value: &str) -> Result<()>;
}

/// Logs everything through `tracing`; outputs are log events only.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        info!(output = name, value, "output set");
        Ok(())
    }
}

/// GitHub Actions reporting.
///
/// Outputs are appended to the file named by `GITHUB_OUTPUT`. Outside a
/// runner the legacy `::set-output` workflow command is printed instead.
#[derive(Debug, Default, Clone)]
pub struct GithubActionsSink {
    output_file: Option<PathBuf>,
}

impl GithubActionsSink {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        )
    }

    /// One output entry in the `GITHUB_OUTPUT` file format.
    fn format_entry(name: &str, value: &str) -> String {
        if value.contains('\n') {
            let mut delimiter = String::from("ghadelimiter");
            while value.contains(&delimiter) {
                delimiter.push('_');
            }
            format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
        } else {
            format!("{name}={value}\n")
        }
    }
}

impl OutputSink for GithubActionsSink {
    /// Printed straight to stdout so the line lands in the job log whatever
    /// the tracing configuration.
    fn info(&self, message: &str) {
        debug!("{}", message);
        che_println!("{}", message);
    }

    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        match &self.output_file {
            Some(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| LifecycleError::Output {
                        name: name.to_string(),
                        source,
                    })?;
                file.write_all(Self::format_entry(name, value).as_bytes())
                    .map_err(|source| LifecycleError::Output {
                        name: name.to_string(),
                        source,
                    })
            }
            None => {
                println!("::set-output name={name}::{value}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn single_line_entry() {
        assert_eq!(
            GithubActionsSink::format_entry("workspace-url", "https://che.example.com/ws/1"),
            "workspace-url=https://che.example.com/ws/1\n"
        );
    }

    #[test]
    fn multi_line_entry_uses_unique_delimiter() {
        let entry = GithubActionsSink::format_entry("log", "a\nghadelimiter\nb");
        assert_eq!(
            entry,
            "log<<ghadelimiter_\na\nghadelimiter\nb\nghadelimiter_\n"
        );
    }

    #[test]
    fn appends_to_output_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("github_output");
        std::fs::write(&path, "previous=1\n").expect("seed file");

        let sink = GithubActionsSink::new(Some(path.clone()));
        sink.set_output("workspace-url", "https://che.example.com/ws/123")
            .expect("write output");

        let contents = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(
            contents,
            "previous=1\nworkspace-url=https://che.example.com/ws/123\n"
        );
    }

    #[test]
    fn unwritable_output_file_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let sink = GithubActionsSink::new(Some(dir.path().join("missing").join("out")));

        let err = sink
            .set_output("workspace-url", "https://x")
            .expect_err("parent dir does not exist");
        assert!(matches!(err, LifecycleError::Output { ref name, .. } if name == "workspace-url"));
    }
}
