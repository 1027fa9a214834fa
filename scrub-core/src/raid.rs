//! Software RAID (mdadm) discovery and teardown.
//!
//! `mdadm -v --query --detail --scan` prints one two-line record per array:
//!
//! ```text
//! ARRAY /dev/md0 level=raid1 num-devices=2 metadata=1.2 name=0 UUID=77e1b6f2:56530ebd:38bd6808:17fd01c4
//!    devices=/dev/vda2,/dev/vda3
//! ```
//!
//! The topology is re-read for every decision; device state changes between steps.

use regex::Regex;
use scrub_error::{CleanupError, CleanupResult, HalError};
use scrub_hal::{DevicePath, ProcessOps, ResolveOps};

const SCAN_ARGS: &[&str] = &["-v", "--query", "--detail", "--scan"];
const ARRAY_HEADER: &str = "ARRAY";
const MEMBER_PREFIX: &str = "devices=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidArray {
    pub name: DevicePath,
    /// Member devices exactly as mdadm reported them.
    pub members: Vec<String>,
}

impl RaidArray {
    pub fn matching_members<'a>(
        &'a self,
        matcher: &'a MemberMatcher,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.members
            .iter()
            .map(String::as_str)
            .filter(move |member| matcher.matches(member))
    }

    pub fn has_member(&self, matcher: &MemberMatcher) -> bool {
        self.matching_members(matcher).next().is_some()
    }
}

/// Arrays in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaidTopology {
    arrays: Vec<RaidArray>,
}

impl RaidTopology {
    pub fn arrays(&self) -> &[RaidArray] {
        &self.arrays
    }

    pub fn get(&self, name: &str) -> Option<&RaidArray> {
        self.arrays.iter().find(|a| a.name.as_str() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// A repeated array replaces the earlier record but keeps its position.
    fn insert(&mut self, array: RaidArray) {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(existing) => *existing = array,
            None => self.arrays.push(array),
        }
    }
}

/// Matches a device and its numbered partitions against mdadm member strings.
///
/// `/dev/sda` matches `/dev/sda`, `/dev/sda1`, `/dev/sda23`; disks ending in a digit also
/// match the `p`-separated form (`/dev/nvme0n1p2`).
#[derive(Debug, Clone)]
pub struct MemberMatcher {
    pattern: Regex,
}

impl MemberMatcher {
    pub fn new(device: &DevicePath) -> CleanupResult<Self> {
        let base = regex::escape(device.as_str());
        let source = match device.partition_separator() {
            "" => format!(r"^{}\d*$", base),
            sep => format!(r"^{}(?:\d*|{}\d+)$", base, regex::escape(sep)),
        };
        let pattern = Regex::new(&source)
            .map_err(|e| HalError::Parse(format!("member pattern for {}: {}", device, e)))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, member: &str) -> bool {
        self.pattern.is_match(member.trim())
    }
}

fn malformed(detail: String) -> CleanupError {
    CleanupError::Query {
        what: "RAID devices",
        detail,
    }
}

/// Parse scan output into a topology, resolving every array name.
///
/// Fails as a whole on the first malformed record or unresolvable array: partial topology
/// is never returned.
pub fn parse_topology<R: ResolveOps + ?Sized>(
    output: &str,
    resolver: &R,
) -> CleanupResult<RaidTopology> {
    let mut topology = RaidTopology::default();
    let mut lines = output.lines();

    while let Some(line) = lines.next() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(ARRAY_HEADER) {
            continue;
        }

        let device = tokens
            .next()
            .ok_or_else(|| malformed(format!("ARRAY line without a device: {:?}", line.trim())))?;
        let name = resolver
            .resolve_device(device)
            .map_err(|source| CleanupError::Resolution {
                path: device.to_string(),
                source,
            })?;

        let members = lines
            .next()
            .map(str::trim)
            .and_then(|next| next.strip_prefix(MEMBER_PREFIX))
            .ok_or_else(|| malformed(format!("no {} line after ARRAY {}", MEMBER_PREFIX, device)))?;

        topology.insert(RaidArray {
            name,
            members: members
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(ToString::to_string)
                .collect(),
        });
    }

    Ok(topology)
}

pub fn read_topology<H: ProcessOps + ResolveOps + ?Sized>(hal: &H) -> CleanupResult<RaidTopology> {
    let out = hal.execute("mdadm", SCAN_ARGS)?;
    if !out.success() {
        return Err(CleanupError::query("RAID devices", &out.stderr));
    }
    parse_topology(&out.stdout, hal)
}

/// Whether `device` or one of its partitions belongs to any array.
///
/// Best effort: if the topology cannot be read the device is treated as a non-member and
/// RAID cleanup is skipped.
pub fn is_raid_member<H: ProcessOps + ResolveOps + ?Sized>(hal: &H, device: &DevicePath) -> bool {
    let topology = match read_topology(hal) {
        Ok(topology) => topology,
        Err(e) => {
            log::warn!(
                "Could not read RAID topology, continuing without RAID cleanup of {}: {}",
                device,
                e
            );
            return false;
        }
    };
    let matcher = match MemberMatcher::new(device) {
        Ok(matcher) => matcher,
        Err(e) => {
            log::warn!("Cannot match RAID members for {}: {}", device, e);
            return false;
        }
    };
    topology.arrays().iter().any(|array| array.has_member(&matcher))
}

/// Every array that has `device` or one of its partitions as a member.
pub fn associated_arrays<H: ProcessOps + ResolveOps + ?Sized>(
    hal: &H,
    device: &DevicePath,
) -> CleanupResult<Vec<RaidArray>> {
    let topology = read_topology(hal)?;
    let matcher = MemberMatcher::new(device)?;
    Ok(topology
        .arrays()
        .iter()
        .filter(|array| array.has_member(&matcher))
        .cloned()
        .collect())
}

/// Stop every array `device` participates in and zero the superblocks of its matching members.
pub fn clean_membership<H: ProcessOps + ResolveOps + ?Sized>(
    hal: &H,
    device: &DevicePath,
) -> CleanupResult<()> {
    let topology = read_topology(hal)?;
    let matcher = MemberMatcher::new(device)?;
    for array in topology.arrays() {
        remove_device_from_array(hal, array, &matcher)?;
    }
    Ok(())
}

fn remove_device_from_array<H: ProcessOps + ?Sized>(
    hal: &H,
    array: &RaidArray,
    matcher: &MemberMatcher,
) -> CleanupResult<()> {
    let mut stopped = false;

    for member in array.matching_members(matcher) {
        // A superblock must never be zeroed under a running array.
        if !stopped {
            log::info!("Stopping RAID array {}", array.name);
            let out = hal.execute("mdadm", &["--stop", array.name.as_str()])?;
            if !out.success() {
                return Err(CleanupError::teardown(
                    format!("stop RAID device {}", array.name),
                    &out.stderr,
                ));
            }
            stopped = true;
        }

        // The member is passed as mdadm printed it; mdadm accepts its own names back.
        log::info!("Zeroing RAID superblock on {}", member);
        let out = hal.execute("mdadm", &["--zero-superblock", member])?;
        if !out.success() {
            return Err(CleanupError::teardown(
                format!("clean RAID member {} superblock", member),
                &out.stderr,
            ));
        }
    }
    Ok(())
}
