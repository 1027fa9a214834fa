//! CLI argument parsing for disk-scrub.

use anyhow::Result;
use clap::Parser;
use scrub_core::CleanupConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "disk-scrub", version)]
#[command(about = "Remove LVM, RAID and filesystem signatures from an installation disk")]
#[command(long_about = "Remove LVM, RAID and filesystem signatures from an installation disk.\n\n\
    Volume groups and physical volumes are removed first, then any RAID array the disk\n\
    belongs to is stopped and its superblocks zeroed, and finally all signatures are wiped.\n\
    The JSON response is printed to stdout; errors go to stderr.")]
pub struct Cli {
    /// Cleanup request as JSON, e.g. '{"path":"/dev/sda"}'
    pub request: String,

    /// Report success without touching the device
    #[arg(long)]
    pub dry_run: bool,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of the default
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Send logs to stdout
    #[arg(long)]
    pub stdout_logging: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Config file, then environment, then flags.
    pub fn resolve_config(&self) -> Result<CleanupConfig> {
        let mut cfg = match &self.config {
            Some(path) => CleanupConfig::load(path)?,
            None => CleanupConfig::default(),
        };
        cfg.apply_env();
        self.apply_flags(&mut cfg);
        Ok(cfg)
    }

    fn apply_flags(&self, cfg: &mut CleanupConfig) {
        if self.dry_run {
            cfg.dry_run = true;
        }
        if let Some(file) = &self.log_file {
            cfg.logging.file = Some(file.clone());
        }
        if self.stdout_logging {
            cfg.logging.stdout = true;
        }
        if let Some(level) = &self.log_level {
            cfg.logging.level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_the_positional_argument() {
        let cli = Cli::try_parse_from(["disk-scrub", "--dry-run", r#"{"path":"/dev/sda"}"#])
            .unwrap();
        assert_eq!(cli.request, r#"{"path":"/dev/sda"}"#);
        assert!(cli.dry_run);
    }

    #[test]
    fn request_is_required() {
        assert!(Cli::try_parse_from(["disk-scrub", "--dry-run"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "disk-scrub",
            "--log-file",
            "/tmp/scrub.log",
            "--log-level",
            "debug",
            "--stdout-logging",
            "--dry-run",
            "{}",
        ])
        .unwrap();
        let mut cfg = CleanupConfig::default();
        cli.apply_flags(&mut cfg);

        assert!(cfg.dry_run);
        assert!(cfg.logging.stdout);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(
            cfg.logging.file.as_deref(),
            Some(std::path::Path::new("/tmp/scrub.log"))
        );
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let cli = Cli::try_parse_from(["disk-scrub", "{}"]).unwrap();
        let mut cfg = CleanupConfig {
            dry_run: true,
            ..CleanupConfig::default()
        };
        cli.apply_flags(&mut cfg);
        assert!(cfg.dry_run);
        assert_eq!(cfg.logging, scrub_core::LoggingConfig::default());
    }
}
