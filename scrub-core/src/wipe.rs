//! Filesystem / partition-table signature wipe.

use scrub_error::{CleanupError, CleanupResult};
use scrub_hal::{DevicePath, ProcessOps};

/// `wipefs --all --force`, falling back once to `wipefs --all` for builds that reject `--force`.
///
/// When both attempts fail the error carries the fallback's stderr.
pub fn wipe_signatures<H: ProcessOps + ?Sized>(hal: &H, device: &DevicePath) -> CleanupResult<()> {
    log::info!("Wiping signatures from {}", device);
    let forced = hal.execute("wipefs", &["--all", "--force", device.as_str()])?;
    if forced.success() {
        return Ok(());
    }

    log::warn!(
        "wipefs --force failed on {} ({}), retrying without --force",
        device,
        forced.stderr.trim()
    );
    let plain = hal.execute("wipefs", &["--all", device.as_str()])?;
    if !plain.success() {
        return Err(CleanupError::teardown(
            format!("wipe signatures from {}", device),
            &plain.stderr,
        ));
    }
    Ok(())
}
