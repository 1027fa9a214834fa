//! Fake HAL implementation for testing.
//!
//! This implementation records all operations without executing them and answers commands
//! from a script, allowing CI-safe testing of the cleanup flow without root privileges or
//! real disks.

use super::{command_line, CommandOutput, HostOps, ProcessOps, ResolveOps};
use crate::{DevicePath, HalError, HalResult};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Same bound the kernel uses for nested symlinks.
const MAX_LINK_HOPS: usize = 40;

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Resolve { path: String },
    Command { program: String, args: Vec<String> },
    EnsureRoot,
}

impl Operation {
    /// Shell-style command line for `Command` records.
    pub fn command_line(&self) -> Option<String> {
        match self {
            Operation::Command { program, args } => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                Some(command_line(program, &args))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct FakeHalState {
    operations: Vec<Operation>,
    /// Scripted answers keyed by full command line.
    responses: HashMap<String, VecDeque<CommandOutput>>,
    links: HashMap<String, String>,
    missing: HashSet<String>,
    not_root: bool,
}

/// Fake HAL that records operations and replays scripted command output.
///
/// Unscripted commands succeed with empty output. When several outputs are queued for the
/// same command line they are consumed in order and the last one keeps being returned.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeHalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `output` as the answer for `line` (e.g. `"vgs --noheadings -o vg_name,pv_name"`).
    pub fn script(&self, line: &str, output: CommandOutput) {
        self.state()
            .responses
            .entry(line.to_string())
            .or_default()
            .push_back(output);
    }

    pub fn script_stdout(&self, line: &str, stdout: &str) {
        self.script(line, CommandOutput::ok(stdout));
    }

    pub fn script_failure(&self, line: &str, exit_code: i32, stderr: &str) {
        self.script(line, CommandOutput::failed(exit_code, stderr));
    }

    /// Make `link` resolve to `target`.
    pub fn add_symlink(&self, link: &str, target: &str) {
        self.state()
            .links
            .insert(link.to_string(), target.to_string());
    }

    /// Make resolution of `path` fail as if it did not exist.
    pub fn mark_missing(&self, path: &str) {
        self.state().missing.insert(path.to_string());
    }

    pub fn set_root(&self, is_root: bool) {
        self.state().not_root = !is_root;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        self.state().operations.len()
    }

    /// Recorded external commands, in order, as shell-style lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.state()
            .operations
            .iter()
            .filter_map(Operation::command_line)
            .collect()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state().operations.iter().any(check)
    }

    /// Clear recorded operations; scripts and links stay in place.
    pub fn clear(&self) {
        self.state().operations.clear();
    }

    fn record_operation(&self, op: Operation) {
        self.state().operations.push(op);
    }
}

impl ProcessOps for FakeHal {
    fn execute(&self, program: &str, args: &[&str]) -> HalResult<CommandOutput> {
        self.record_operation(Operation::Command {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        });

        let line = command_line(program, args);
        log::info!("FAKE HAL: {}", line);

        let mut state = self.state();
        let output = match state.responses.get_mut(&line) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => CommandOutput::default(),
        };
        Ok(output)
    }
}

impl ResolveOps for FakeHal {
    fn resolve_device(&self, path: &str) -> HalResult<DevicePath> {
        self.record_operation(Operation::Resolve {
            path: path.to_string(),
        });

        let state = self.state();
        let mut current = path.to_string();
        for _ in 0..MAX_LINK_HOPS {
            if state.missing.contains(&current) {
                return Err(HalError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{}: No such file or directory", current),
                )));
            }
            match state.links.get(&current) {
                Some(next) => current = next.clone(),
                None => return DevicePath::from_canonical(PathBuf::from(current)),
            }
        }
        Err(HalError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("{}: Too many levels of symbolic links", path),
        )))
    }
}

impl HostOps for FakeHal {
    fn ensure_root(&self) -> HalResult<()> {
        self.record_operation(Operation::EnsureRoot);
        if self.state().not_root {
            return Err(HalError::PermissionDenied(
                "disk cleanup must run as root".to_string(),
            ));
        }
        Ok(())
    }
}
