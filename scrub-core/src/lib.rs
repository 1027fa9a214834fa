//! disk-scrub core: removes LVM, RAID and signature metadata from an installation disk.
//!
//! The engine is expressed purely in terms of the `scrub-hal` traits; see
//! [`cleanup::DiskCleanup`] for the full procedure.

pub mod cleanup;
pub mod config;
pub mod logging;
pub mod lvm;
pub mod raid;
pub mod request;
pub mod wipe;

pub use cleanup::{CleanupFailure, DiskCleanup, Stage};
pub use config::{CleanupConfig, LoggingConfig};
pub use request::{handle_request, CleanupOutcome, CleanupRequest, CleanupResponse};
pub use scrub_error::{CleanupError, CleanupResult};
