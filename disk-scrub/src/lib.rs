//! disk-scrub: single-shot disk cleanup before an OS installation.

pub mod cli;

use scrub_core::{handle_request, CleanupConfig, CleanupOutcome, DiskCleanup};
use scrub_hal::CleanupHal;

/// Handle one raw JSON request against `hal` with the given configuration.
pub fn run<H: CleanupHal + ?Sized>(cfg: &CleanupConfig, hal: &H, request: &str) -> CleanupOutcome {
    let engine = DiskCleanup::new(hal, cfg.dry_run);
    handle_request(&engine, request)
}
