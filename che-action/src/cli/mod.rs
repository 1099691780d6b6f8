// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "che-action")]
#[command(about = "Create, await and stop Eclipse Che workspaces")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a che-action.yaml configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create and start a workspace, wait for it to run, then stop it
    Start {
        /// Devfile to create the workspace from (URL or path)
        #[arg(long)]
        devfile: Option<String>,

        /// How long to wait for the workspace pod to run
        #[arg(long, value_name = "MS")]
        start_timeout_ms: Option<u64>,

        /// Delay between running-pod checks
        #[arg(long, value_name = "MS")]
        poll_interval_ms: Option<u64>,

        /// Wait after the stop command for teardown
        #[arg(long, value_name = "MS")]
        settle_ms: Option<u64>,
    },

    /// Wait until a workspace pod is running
    Wait {
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
    },

    /// Stop the last workspace listed by chectl
    Stop {
        #[arg(long, value_name = "MS")]
        settle_ms: Option<u64>,
    },

    /// Resolve a repository through the Che factory API
    ResolveFactory {
        /// Repository URL to resolve
        repo_url: String,

        /// Che server URL (overrides configuration)
        #[arg(long)]
        che_url: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_start_overrides() {
        let args = Args::parse_from([
            "che-action",
            "--debug",
            "start",
            "--devfile",
            "https://example.com/devfile.yaml",
            "--poll-interval-ms",
            "250",
        ]);

        assert!(args.debug);
        match args.command {
            Command::Start {
                devfile,
                poll_interval_ms,
                start_timeout_ms,
                ..
            } => {
                assert_eq!(devfile.as_deref(), Some("https://example.com/devfile.yaml"));
                assert_eq!(poll_interval_ms, Some(250));
                assert_eq!(start_timeout_ms, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_after_subcommand() {
        let args = Args::parse_from(["che-action", "stop", "--config", "ci.yaml"]);
        assert_eq!(args.config, Some(PathBuf::from("ci.yaml")));
        assert!(matches!(args.command, Command::Stop { settle_ms: None }));
    }
}
