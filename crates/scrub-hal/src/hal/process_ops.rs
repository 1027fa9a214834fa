//! Process execution.
//!
//! External commands are considered "world-touching" and must go through the HAL so we can
//! test the cleanup flow without spawning real processes.

use crate::HalResult;
use std::process::Output;

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        }
    }
}

/// External command runner.
///
/// A single synchronous call: no retry, no timeout. `Err` means the program could not be
/// run at all; a non-zero exit is reported through [`CommandOutput::exit_code`].
pub trait ProcessOps {
    fn execute(&self, program: &str, args: &[&str]) -> HalResult<CommandOutput>;
}

/// Render an invocation the way it would be typed in a shell (used for logs and fake keys).
pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
