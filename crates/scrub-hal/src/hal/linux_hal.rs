//! Linux HAL implementation using real processes and the real filesystem.

use super::{command_line, CommandOutput, HostOps, ProcessOps, ResolveOps};
use crate::{DevicePath, HalError, HalResult};
use std::fs;
use std::process::{Command, Stdio};

/// Real HAL implementation for Linux systems.
#[derive(Debug, Clone, Default)]
pub struct LinuxHal;

impl LinuxHal {
    pub fn new() -> Self {
        Self
    }
}

fn map_command_err(program: &str, err: std::io::Error) -> HalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return HalError::CommandNotFound(program.to_string());
    }
    HalError::Io(err)
}

impl ProcessOps for LinuxHal {
    fn execute(&self, program: &str, args: &[&str]) -> HalResult<CommandOutput> {
        log::debug!("exec: {}", command_line(program, args));

        // Never let a tool sit waiting on a prompt; every caller passes -y/--force anyway.
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| map_command_err(program, e))?;

        let output = CommandOutput::from(output);
        if !output.success() {
            log::debug!(
                "{} exited with {}: {}",
                program,
                output.exit_code,
                output.stderr.trim()
            );
        }
        Ok(output)
    }
}

impl ResolveOps for LinuxHal {
    fn resolve_device(&self, path: &str) -> HalResult<DevicePath> {
        let real = fs::canonicalize(path)?;
        DevicePath::from_canonical(real)
    }
}

impl HostOps for LinuxHal {
    fn ensure_root(&self) -> HalResult<()> {
        if nix::unistd::geteuid().is_root() {
            return Ok(());
        }
        Err(HalError::PermissionDenied(
            "disk cleanup must run as root".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    #[test]
    fn execute_captures_streams_and_exit_code() {
        let hal = LinuxHal::new();
        let out = hal
            .execute("sh", &["-c", "echo out; echo err >&2; exit 3"])
            .unwrap();
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
        assert_eq!(out.exit_code, 3);
        assert!(!out.success());
    }

    #[test]
    fn execute_reports_missing_program() {
        let hal = LinuxHal::new();
        let err = hal
            .execute("definitely-not-a-real-program-4242", &[])
            .unwrap_err();
        assert!(matches!(err, HalError::CommandNotFound(p) if p == "definitely-not-a-real-program-4242"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_follows_symlink_chain() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("sdz");
        fs::write(&target, b"").unwrap();
        let hop = dir.path().join("by-path");
        let link = dir.path().join("by-id");
        symlink(&target, &hop).unwrap();
        symlink(&hop, &link).unwrap();

        let hal = LinuxHal::new();
        let resolved = hal.resolve_device(link.to_str().unwrap()).unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&target).unwrap());
    }

    #[test]
    fn resolve_fails_for_missing_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        let hal = LinuxHal::new();
        assert!(matches!(
            hal.resolve_device(missing.to_str().unwrap()),
            Err(HalError::Io(_))
        ));
    }
}
