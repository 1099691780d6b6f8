use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The command ran but exited with a non-zero status.
    Command {
        command: String,
        code: Option<i32>,
        output: String,
    },
    /// The command could not be launched at all.
    Spawn {
        command: String,
        source: std::io::Error,
    },
    Dependency(String),
    Io(#[from] std::io::Error),
    Internal(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CoreError::Command {
                command,
                code,
                output,
            } => {
                write!(f, "Command failed with exit code {:?}: {}", code, command)?;
                if !output.is_empty() {
                    write!(f, "\n\nOutput (last 50 lines):\n{}", output)?;
                }
                Ok(())
            }
            CoreError::Spawn { command, source } => {
                write!(f, "Failed to start command '{}': {}", command, source)
            }
            CoreError::Dependency(s) => {
                write!(f, "Dependency not found: {}\n\n", s)?;
                write!(f, "Fix:\n")?;
                write!(f, "  • Install it and make sure it is on PATH\n")?;
                write!(f, "  • Or point the configuration at the binary explicitly")
            }
            CoreError::Io(e) => write!(f, "I/O error: {}", e),
            CoreError::Internal(s) => write!(f, "Internal error: {}", s),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
