//! Host privilege checks.

use crate::HalResult;

pub trait HostOps {
    /// Fail unless the current process can modify block device metadata.
    fn ensure_root(&self) -> HalResult<()>;
}
