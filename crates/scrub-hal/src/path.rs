//! Block device path helpers.

use crate::{HalError, HalResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// A symlink-resolved path to a block device or partition.
///
/// Only the [`ResolveOps`](crate::ResolveOps) implementations construct these, so any
/// `DevicePath` is safe to compare against paths reported by storage tooling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevicePath(String);

impl DevicePath {
    pub(crate) fn from_canonical(path: PathBuf) -> HalResult<Self> {
        path.into_os_string()
            .into_string()
            .map(Self)
            .map_err(|raw| HalError::Parse(format!("device path is not UTF-8: {:?}", raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Separator the kernel puts between this disk's name and a partition number.
    pub fn partition_separator(&self) -> &'static str {
        partition_separator(&self.0)
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DevicePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Disks whose name ends in a digit (nvme0n1, mmcblk0, loop3, md0) get a `p` before the
/// partition number; everything else (sda, vdb) gets nothing.
pub fn partition_separator(disk: &str) -> &'static str {
    let name = disk.rsplit('/').next().unwrap_or(disk);
    if name.ends_with(|c: char| c.is_ascii_digit()) {
        "p"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_depends_on_trailing_digit() {
        assert_eq!(partition_separator("/dev/sda"), "");
        assert_eq!(partition_separator("/dev/vdb"), "");
        assert_eq!(partition_separator("/dev/nvme0n1"), "p");
        assert_eq!(partition_separator("/dev/mmcblk0"), "p");
        assert_eq!(partition_separator("md127"), "p");
    }

    #[test]
    fn device_path_displays_its_string() {
        let dev = DevicePath::from_canonical(PathBuf::from("/dev/sdb")).unwrap();
        assert_eq!(dev.to_string(), "/dev/sdb");
        assert_eq!(dev.as_path(), Path::new("/dev/sdb"));
        assert_eq!(dev.partition_separator(), "");
    }
}
