use crate::config::LoggingConfig;
use env_logger::Target;
use log::LevelFilter;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Install the global logger. Later calls are ignored.
///
/// Logs never go to stdout unless asked for: stdout carries the JSON response.
pub fn init(cfg: &LoggingConfig) {
    // The logger is not up yet, so a bad level can only be reported on stderr.
    let level = parse_level(&cfg.level).unwrap_or_else(|| {
        eprintln!(
            "ignoring log level {:?}: expected off, error, warn, info, debug or trace; using info",
            cfg.level
        );
        LevelFilter::Info
    });

    // One-shot runs log to a stable file when possible; otherwise stderr.
    let target = if cfg.stdout {
        Target::Stdout
    } else {
        cfg.file
            .as_deref()
            .and_then(|path| open_log_file(path).ok())
            .map(|file| Target::Pipe(Box::new(file)))
            .unwrap_or(Target::Stderr)
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(target)
        .try_init();
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    LevelFilter::from_str(raw.trim()).ok()
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
