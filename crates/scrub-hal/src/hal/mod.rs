//! HAL trait definitions and implementations.
//!
//! This module defines the narrow traits the cleanup engine depends on and provides
//! both real (LinuxHal) and fake (FakeHal) implementations.

pub mod fake_hal;
pub mod host_ops;
pub mod linux_hal;
pub mod process_ops;
pub mod resolve_ops;

pub use fake_hal::{FakeHal, Operation};
pub use host_ops::HostOps;
pub use linux_hal::LinuxHal;
pub use process_ops::{command_line, CommandOutput, ProcessOps};
pub use resolve_ops::ResolveOps;

/// Complete HAL combining all operation traits.
pub trait CleanupHal: ProcessOps + ResolveOps + HostOps + Send + Sync {}

/// Automatically implement CleanupHal for any type implementing all required traits.
impl<T> CleanupHal for T where T: ProcessOps + ResolveOps + HostOps + Send + Sync {}
