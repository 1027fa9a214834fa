//! Host abstraction layer for disk-scrub.
//!
//! Everything that touches the world (spawning `vgs`/`mdadm`/`wipefs`, dereferencing
//! `/dev` symlinks, checking privileges) goes through the traits in [`hal`], so the
//! cleanup engine can run against [`FakeHal`] in tests.

pub mod hal;
pub mod path;

pub use hal::{
    CleanupHal, CommandOutput, FakeHal, HostOps, LinuxHal, Operation, ProcessOps, ResolveOps,
};
pub use path::DevicePath;
pub use scrub_error::{HalError, HalResult};
