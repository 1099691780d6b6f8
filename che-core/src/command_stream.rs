// Standard library
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};

// External crates
use crate::error::{CoreError, Result};
use duct::cmd;
use tracing::info;
use which::which;

/// Receives each stdout line of a running command as soon as it is printed.
pub trait LineObserver: Send {
    /// Handles a single line of output.
    fn observe_line(&mut self, line: &str);
    /// Called once the command has exited.
    fn finish(&mut self) {}
}

impl<F> LineObserver for F
where
    F: FnMut(&str) + Send,
{
    fn observe_line(&mut self, line: &str) {
        self(line)
    }
}

/// Forwards every line to the tracing subscriber at info level.
#[derive(Debug, Default)]
pub struct LogObserver {
    prefix: Option<String>,
}

impl LogObserver {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl LineObserver for LogObserver {
    fn observe_line(&mut self, line: &str) {
        match &self.prefix {
            Some(prefix) => info!("[{}] {}", prefix, line),
            None => info!("{}", line),
        }
    }
}

/// Buffered result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Output of a command that exited zero after printing `stdout`.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            code: Some(0),
        }
    }
}

fn render_command<A: AsRef<OsStr>>(command: &str, args: &[A]) -> String {
    let mut rendered = command.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

fn tail(text: &str, lines: usize) -> String {
    let collected: Vec<&str> = text.lines().collect();
    let start = collected.len().saturating_sub(lines);
    collected[start..].join("\n")
}

/// Runs `command`, handing each stdout line to `observer` while it is
/// produced and buffering the full stdout for the caller.
///
/// Stderr is captured separately so it never leaks into the text callers
/// parse. A non-zero exit becomes [`CoreError::Command`] carrying the last
/// 50 lines of both streams.
pub fn stream_and_capture<A: AsRef<OsStr>>(
    command: &str,
    args: &[A],
    observer: &mut dyn LineObserver,
) -> Result<CommandOutput> {
    let full_command = render_command(command, args);

    let reader = cmd(command, args)
        .stderr_capture()
        .unchecked()
        .reader()
        .map_err(|source| CoreError::Spawn {
            command: full_command.clone(),
            source,
        })?;

    // Lines are decoded lossily: a stray non-UTF-8 byte must not abort the
    // read, since dropping the reader kills the child.
    let mut stdout = String::new();
    let mut buffered = BufReader::new(&reader);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if buffered.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(trim_line_ending(&raw));
        observer.observe_line(&line);
        stdout.push_str(&line);
        stdout.push('\n');
    }
    observer.finish();

    let output = reader.try_wait()?.ok_or_else(|| {
        CoreError::Internal(format!(
            "Command '{}' closed its output but did not exit",
            full_command
        ))
    })?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let code = output.status.code();

    if !output.status.success() {
        let mut context = tail(&stdout, 50);
        let stderr_tail = tail(&stderr, 50);
        if !stderr_tail.is_empty() {
            if !context.is_empty() {
                context.push('\n');
            }
            context.push_str(&stderr_tail);
        }
        return Err(CoreError::Command {
            command: full_command,
            code,
            output: context,
        });
    }

    Ok(CommandOutput {
        stdout,
        stderr,
        code,
    })
}

fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Checks if a command-line tool is available in the system's PATH.
pub fn is_tool_installed(tool_name: &str) -> bool {
    which(tool_name).is_ok()
}

/// Fails with [`CoreError::Dependency`] when `tool_name` cannot be found.
pub fn require_tool(tool_name: &str) -> Result<()> {
    if is_tool_installed(tool_name) {
        Ok(())
    } else {
        Err(CoreError::Dependency(tool_name.to_string()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_and_forwards_every_line() {
        let mut seen = Vec::new();
        let mut observer = |line: &str| seen.push(line.to_string());

        let output = stream_and_capture("sh", &["-c", "echo one; echo two"], &mut observer)
            .expect("command should succeed");

        assert_eq!(output.stdout, "one\ntwo\n");
        assert_eq!(output.code, Some(0));
        assert_eq!(seen, vec!["one", "two"]);
    }

    #[test]
    fn invalid_utf8_line_does_not_stop_the_command() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let marker = dir.path().join("marker");
        let script = format!(
            "printf 'progress \\377\\n'; echo 'Workspace IDE URL: https://che.example.com/ws/1'; echo done > '{}'",
            marker.display()
        );
        let mut seen = Vec::new();
        let mut observer = |line: &str| seen.push(line.to_string());

        let output = stream_and_capture("sh", &["-c", script.as_str()], &mut observer)
            .expect("command should succeed");

        assert!(output
            .stdout
            .contains("Workspace IDE URL: https://che.example.com/ws/1\n"));
        assert_eq!(seen[0], "progress \u{FFFD}");
        assert!(marker.exists(), "child ran to completion");
    }

    #[test]
    fn crlf_line_endings_are_trimmed() {
        let mut seen = Vec::new();
        let mut observer = |line: &str| seen.push(line.to_string());

        let output = stream_and_capture("sh", &["-c", "printf 'one\\r\\ntwo'"], &mut observer)
            .expect("command should succeed");

        assert_eq!(output.stdout, "one\ntwo\n");
        assert_eq!(seen, vec!["one", "two"]);
    }

    #[test]
    fn stderr_is_kept_out_of_stdout() {
        let mut observer = LogObserver::default();
        let output = stream_and_capture("sh", &["-c", "echo out; echo err 1>&2"], &mut observer)
            .expect("command should succeed");

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn non_zero_exit_reports_output() {
        let mut observer = LogObserver::default();
        let err = stream_and_capture("sh", &["-c", "echo boom; exit 3"], &mut observer)
            .expect_err("command should fail");

        match err {
            CoreError::Command {
                command,
                code,
                output,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(code, Some(3));
                assert!(output.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let mut observer = LogObserver::default();
        let err = stream_and_capture(
            "definitely-not-a-real-binary-4c1e",
            &[] as &[&str],
            &mut observer,
        )
        .expect_err("spawn should fail");

        assert!(matches!(err, CoreError::Spawn { .. }));
    }

    #[test]
    fn tail_keeps_last_lines() {
        let text = (1..=60).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let kept = tail(&text, 50);
        assert!(kept.starts_with("11\n"));
        assert!(kept.ends_with("60"));
    }
}
