//! Device path resolution.

use crate::{DevicePath, HalResult};

/// Symlink resolution for device paths.
pub trait ResolveOps {
    /// Fully dereference `path` (e.g. `/dev/disk/by-id/...` -> `/dev/sda`).
    ///
    /// Fails if the path does not exist or a link in the chain cannot be followed.
    fn resolve_device(&self, path: &str) -> HalResult<DevicePath>;
}
