use std::io;
use thiserror::Error;

pub type HalResult<T> = Result<T, HalError>;
pub type CleanupResult<T> = Result<T, CleanupError>;

/// Failures of the host layer itself (spawning programs, touching the filesystem).
///
/// A program that runs and exits non-zero is *not* a `HalError`; callers inspect the
/// captured exit code and decide.
#[derive(Error, Debug)]
pub enum HalError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Malformed disk cleanup request: {0}")]
    RequestMalformed(String),

    #[error("Failed to get real file path of {path}: {source}")]
    Resolution {
        path: String,
        #[source]
        source: HalError,
    },

    #[error("Failed to list {what} in the system: {detail}")]
    Query { what: &'static str, detail: String },

    #[error("Failed to {action}: {stderr}")]
    Teardown { action: String, stderr: String },

    #[error(transparent)]
    Hal(#[from] HalError),
}

impl CleanupError {
    pub fn query(what: &'static str, detail: &str) -> Self {
        Self::Query {
            what,
            detail: detail.trim().to_string(),
        }
    }

    pub fn teardown(action: impl Into<String>, stderr: &str) -> Self {
        Self::Teardown {
            action: action.into(),
            stderr: stderr.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_message_carries_trimmed_stderr() {
        let err = CleanupError::teardown("remove VG vg0", "  Volume group \"vg0\" not found\n");
        assert_eq!(
            err.to_string(),
            "Failed to remove VG vg0: Volume group \"vg0\" not found"
        );
    }

    #[test]
    fn resolution_message_names_the_path() {
        let err = CleanupError::Resolution {
            path: "/dev/disk/by-id/missing".to_string(),
            source: HalError::Io(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        };
        let msg = err.to_string();
        assert!(msg.contains("/dev/disk/by-id/missing"));
        assert!(msg.contains("no such file"));
    }
}
