//! Runtime configuration: TOML file, then environment, then CLI flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DRY_RUN_ENV: &str = "DISK_SCRUB_DRY_RUN";
pub const DEFAULT_LOG_FILE: &str = "/var/log/disk-scrub/disk-scrub.log";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Report success without touching the device.
    pub dry_run: bool,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`. `RUST_LOG` still wins.
    pub level: String,
    /// Append logs here; falls back to stderr if it cannot be opened.
    pub file: Option<PathBuf>,
    /// Log to stdout instead of a file.
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            stdout: false,
        }
    }
}

impl CleanupConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid disk-scrub config TOML")
    }

    /// Apply `DISK_SCRUB_DRY_RUN` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(DRY_RUN_ENV) {
            match parse_bool(&raw) {
                Some(value) => self.dry_run = value,
                None => log::warn!("ignoring {}={:?}: not a boolean", DRY_RUN_ENV, raw),
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
