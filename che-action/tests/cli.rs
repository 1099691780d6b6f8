use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_INPUTS: &[&str] = &[
    "INPUT_CHE_URL",
    "INPUT_DEVFILE_URL",
    "CHE_URL",
    "CHE_DEVFILE_URL",
    "CHE_NAMESPACE",
    "GITHUB_OUTPUT",
];

/// `che-action` isolated from the caller's environment and working directory.
fn che_action(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("che-action").expect("binary is built");
    cmd.current_dir(dir.path()).env("LOG_OUTPUT", "none");
    for name in ENV_INPUTS {
        cmd.env_remove(name);
    }
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().expect("temp dir");
    che_action(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("wait"))
        .stdout(predicate::str::contains("stop"))
        .stdout(predicate::str::contains("resolve-factory"));
}

#[test]
fn start_without_devfile_fails() {
    let dir = TempDir::new().expect("temp dir");
    che_action(&dir)
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required setting 'devfile_url'"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().expect("temp dir");
    che_action(&dir)
        .args(["--config", "nope.yaml", "stop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn zero_poll_interval_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    che_action(&dir)
        .args([
            "start",
            "--devfile",
            "https://example.com/devfile.yaml",
            "--poll-interval-ms",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timings.poll_interval_ms"));
}

#[test]
fn resolve_factory_rejects_non_http_che_url() {
    let dir = TempDir::new().expect("temp dir");
    che_action(&dir)
        .args([
            "resolve-factory",
            "https://github.com/eclipse/che",
            "--che-url",
            "ftp://che.example.com",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme 'ftp'"));
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    const FAKE_CHECTL: &str = r#"#!/bin/sh
case "$1" in
  workspace:create) echo "Workspace IDE URL: https://che.example.com/ws/42" ;;
  workspace:list) printf 'ID  STATUS\nworkspace42  RUNNING\n' ;;
  workspace:stop) echo "stopped $2" ;;
esac
"#;

    const FAKE_KUBECTL: &str = r#"#!/bin/sh
echo '{"items":[{"metadata":{"name":"workspace42"}}]}'
"#;

    fn write_script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, body).expect("write script");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
    }

    fn write_config(dir: &Path) {
        write_script(dir, "chectl", FAKE_CHECTL);
        write_script(dir, "kubectl", FAKE_KUBECTL);
        let yaml = format!(
            "devfile_url: https://example.com/devfile.yaml\n\
             chectl_bin: {dir}/chectl\n\
             kubectl_bin: {dir}/kubectl\n\
             timings:\n  start_timeout_ms: 1000\n  poll_interval_ms: 10\n  stop_settle_ms: 0\n",
            dir = dir.display()
        );
        fs::write(dir.join("che-action.yaml"), yaml).expect("write config");
    }

    #[test]
    fn start_publishes_workspace_url_output() {
        let dir = TempDir::new().expect("temp dir");
        write_config(dir.path());
        let outputs = dir.path().join("github_output");

        che_action(&dir)
            .env("GITHUB_OUTPUT", &outputs)
            .arg("start")
            .assert()
            .success()
            .stdout(predicate::str::contains("Create and start workspace..."))
            .stdout(predicate::str::contains(
                "Found a running workspace, do not wait anymore",
            ))
            .stderr(predicate::str::contains("Workspace workspace42"));

        let written = fs::read_to_string(&outputs).expect("outputs written");
        assert_eq!(written, "workspace-url=https://che.example.com/ws/42\n");
    }

    #[test]
    fn stop_targets_last_listed_workspace() {
        let dir = TempDir::new().expect("temp dir");
        write_config(dir.path());

        che_action(&dir)
            .arg("stop")
            .assert()
            .success()
            .stderr(predicate::str::contains("Workspace workspace42 stopped"));
    }
}
