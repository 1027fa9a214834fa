//! Cleanup orchestration.
//!
//! `DryRunCheck -> Preflight -> Resolve -> LvmClean -> RaidCheck -> [RaidTeardown] -> Wipe`.
//! The first failing stage ends the run; nothing already torn down is restored.

use crate::{lvm, raid, wipe};
use scrub_error::CleanupError;
use scrub_hal::{CleanupHal, DevicePath};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Resolve,
    LvmClean,
    RaidCheck,
    RaidTeardown,
    Wipe,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Preflight => "preflight",
            Stage::Resolve => "resolve",
            Stage::LvmClean => "lvm-clean",
            Stage::RaidCheck => "raid-check",
            Stage::RaidTeardown => "raid-teardown",
            Stage::Wipe => "wipe",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct CleanupFailure {
    pub stage: Stage,
    #[source]
    pub source: CleanupError,
}

pub type StageResult<T> = Result<T, CleanupFailure>;

trait AtStage<T> {
    fn at(self, stage: Stage) -> StageResult<T>;
}

impl<T, E: Into<CleanupError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> StageResult<T> {
        self.map_err(|e| {
            let failure = CleanupFailure {
                stage,
                source: e.into(),
            };
            log::error!("{}", failure);
            failure
        })
    }
}

/// Prepares one installation disk: LVM, RAID, then signatures.
pub struct DiskCleanup<'a, H: CleanupHal + ?Sized> {
    hal: &'a H,
    dry_run: bool,
}

impl<'a, H: CleanupHal + ?Sized> DiskCleanup<'a, H> {
    pub fn new(hal: &'a H, dry_run: bool) -> Self {
        Self { hal, dry_run }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run the full procedure against `device` (any path, symlinks allowed).
    pub fn cleanup_device(&self, device: &str) -> StageResult<()> {
        if self.dry_run {
            log::info!("DRY RUN: skipping cleanup of {}", device);
            return Ok(());
        }

        log::info!("[{}] checking privileges", Stage::Preflight);
        self.hal.ensure_root().at(Stage::Preflight)?;

        log::info!("[{}] {}", Stage::Resolve, device);
        let real = self
            .hal
            .resolve_device(device)
            .map_err(|source| CleanupError::Resolution {
                path: device.to_string(),
                source,
            })
            .at(Stage::Resolve)?;
        if real.as_str() != device {
            log::info!("{} resolves to {}", device, real);
        }

        log::info!("[{}] {}", Stage::LvmClean, real);
        lvm::clean_lvm(self.hal, real.as_str()).at(Stage::LvmClean)?;

        log::info!("[{}] {}", Stage::RaidCheck, real);
        if raid::is_raid_member(self.hal, &real) {
            self.clean_raid(&real)?;
        } else {
            log::info!("{} is not a RAID member", real);
        }

        log::info!("[{}] {}", Stage::Wipe, real);
        wipe::wipe_signatures(self.hal, &real).at(Stage::Wipe)?;

        log::info!("Cleanup of {} completed", real);
        Ok(())
    }

    /// The array device and its member disks may each carry LVM state; clear it all before
    /// dismantling the arrays. An active LV on the array makes `mdadm --stop` fail.
    fn clean_raid(&self, device: &DevicePath) -> StageResult<()> {
        log::info!("[{}] {}", Stage::RaidTeardown, device);
        let arrays = raid::associated_arrays(self.hal, device).at(Stage::RaidTeardown)?;
        for array in &arrays {
            log::info!(
                "{} belongs to {} (members: {})",
                device,
                array.name,
                array.members.join(",")
            );
            lvm::clean_lvm(self.hal, array.name.as_str()).at(Stage::RaidTeardown)?;
            // Member names are used exactly as mdadm reports them, the same strings
            // `clean_membership` later passes to --zero-superblock.
            for member in &array.members {
                lvm::clean_lvm(self.hal, member).at(Stage::RaidTeardown)?;
            }
        }
        raid::clean_membership(self.hal, device).at(Stage::RaidTeardown)
    }
}
