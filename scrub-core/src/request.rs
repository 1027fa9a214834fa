//! JSON request/response envelope around [`DiskCleanup`].

use crate::cleanup::DiskCleanup;
use scrub_error::{CleanupError, CleanupResult};
use scrub_hal::CleanupHal;
use serde::{Deserialize, Serialize};

/// Exit status for any failure (reported by the OS as 255).
pub const FAILURE_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CleanupRequest {
    pub path: Option<String>,
}

impl CleanupRequest {
    /// Parse a raw request and return the device path it names.
    pub fn parse_path(raw: &str) -> CleanupResult<String> {
        let request: CleanupRequest = serde_json::from_str(raw).map_err(|e| {
            CleanupError::RequestMalformed(format!("failed to unmarshal request: {}", e))
        })?;
        request
            .path
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| CleanupError::RequestMalformed("missing path in request".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub successful: bool,
    pub path: String,
}

impl CleanupResponse {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// What the process should print and exit with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CleanupOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Validate `raw`, run the cleanup and build the outcome.
///
/// A malformed request never reaches the engine and produces no stdout body.
pub fn handle_request<H: CleanupHal + ?Sized>(
    engine: &DiskCleanup<'_, H>,
    raw: &str,
) -> CleanupOutcome {
    let path = match CleanupRequest::parse_path(raw) {
        Ok(path) => path,
        Err(e) => {
            log::error!("{}", e);
            return CleanupOutcome {
                stdout: String::new(),
                stderr: e.to_string(),
                exit_code: FAILURE_EXIT_CODE,
            };
        }
    };

    log::info!(
        "Disk cleanup requested for {}{}",
        path,
        if engine.dry_run() { " (dry run)" } else { "" }
    );

    match engine.cleanup_device(&path) {
        Ok(()) => CleanupOutcome {
            stdout: CleanupResponse {
                successful: true,
                path,
            }
            .to_json(),
            stderr: String::new(),
            exit_code: 0,
        },
        Err(failure) => {
            let stderr = format!("Failed to run disk cleanup on device {}: {}", path, failure);
            CleanupOutcome {
                stdout: CleanupResponse {
                    successful: false,
                    path,
                }
                .to_json(),
                stderr,
                exit_code: FAILURE_EXIT_CODE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_hal::FakeHal;

    #[test]
    fn parses_path_from_request() {
        assert_eq!(
            CleanupRequest::parse_path(r#"{"path":"/dev/sda"}"#).unwrap(),
            "/dev/sda"
        );
    }

    #[test]
    fn rejects_missing_null_or_blank_path() {
        for raw in [r#"{}"#, r#"{"path":null}"#, r#"{"path":"  "}"#] {
            let err = CleanupRequest::parse_path(raw).unwrap_err();
            assert!(matches!(err, CleanupError::RequestMalformed(_)), "{raw}");
            assert!(err.to_string().contains("missing path"));
        }
    }

    #[test]
    fn rejects_invalid_json() {
        let err = CleanupRequest::parse_path("not json").unwrap_err();
        assert!(err.to_string().contains("failed to unmarshal"));
    }

    #[test]
    fn response_serializes_with_wire_names() {
        let json = CleanupResponse {
            successful: true,
            path: "/dev/sda".to_string(),
        }
        .to_json();
        assert_eq!(json, r#"{"successful":true,"path":"/dev/sda"}"#);
    }

    #[test]
    fn malformed_request_never_reaches_engine() {
        let hal = FakeHal::new();
        let engine = DiskCleanup::new(&hal, false);

        let outcome = handle_request(&engine, r#"{"device":"/dev/sda"}"#);

        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, FAILURE_EXIT_CODE);
        assert!(outcome.stdout.is_empty());
        assert!(outcome.stderr.contains("missing path"));
        assert_eq!(hal.operation_count(), 0);
    }

    #[test]
    fn failure_keeps_request_path_in_response() {
        let hal = FakeHal::new();
        hal.add_symlink("/dev/disk/by-id/x", "/dev/sdx");
        hal.script_failure("wipefs --all --force /dev/sdx", 1, "a");
        hal.script_failure("wipefs --all /dev/sdx", 1, "b");
        let engine = DiskCleanup::new(&hal, false);

        let outcome = handle_request(&engine, r#"{"path":"/dev/disk/by-id/x"}"#);

        let response: CleanupResponse = serde_json::from_str(&outcome.stdout).unwrap();
        assert!(!response.successful);
        assert_eq!(response.path, "/dev/disk/by-id/x");
        assert!(outcome
            .stderr
            .starts_with("Failed to run disk cleanup on device /dev/disk/by-id/x"));
        assert_eq!(outcome.exit_code, FAILURE_EXIT_CODE);
    }
}
