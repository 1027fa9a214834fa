//! LVM discovery and teardown.
//!
//! Volume groups are removed before physical volumes; both are matched against the device by
//! substring so that a whole disk also catches PVs living on its partitions.

use scrub_error::{CleanupError, CleanupResult};
use scrub_hal::ProcessOps;

const VGS_ARGS: &[&str] = &["--noheadings", "-o", "vg_name,pv_name"];
const PVS_ARGS: &[&str] = &["--noheadings", "-o", "pv_name"];

/// VG names from `vgs -o vg_name,pv_name` whose PV column mentions `device`.
///
/// Each VG appears once, in first-seen order, even when several of its PVs are on the disk.
pub fn parse_volume_groups(output: &str, device: &str) -> Vec<String> {
    let mut vgs: Vec<String> = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }
        if fields[1].contains(device) && !vgs.iter().any(|vg| vg == fields[0]) {
            vgs.push(fields[0].to_string());
        }
    }
    vgs
}

/// PV names from `pvs -o pv_name` that mention `device`.
pub fn parse_physical_volumes(output: &str, device: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains(device))
        .map(ToString::to_string)
        .collect()
}

pub fn volume_groups_on<H: ProcessOps + ?Sized>(hal: &H, device: &str) -> CleanupResult<Vec<String>> {
    let out = hal.execute("vgs", VGS_ARGS)?;
    if !out.success() {
        return Err(CleanupError::query("VGs", &out.stderr));
    }
    Ok(parse_volume_groups(&out.stdout, device))
}

pub fn physical_volumes_on<H: ProcessOps + ?Sized>(
    hal: &H,
    device: &str,
) -> CleanupResult<Vec<String>> {
    let out = hal.execute("pvs", PVS_ARGS)?;
    if !out.success() {
        return Err(CleanupError::query("PVs", &out.stderr));
    }
    Ok(parse_physical_volumes(&out.stdout, device))
}

pub fn remove_volume_group<H: ProcessOps + ?Sized>(hal: &H, vg: &str) -> CleanupResult<()> {
    let out = hal.execute("vgremove", &[vg, "-y"])?;
    if !out.success() {
        return Err(CleanupError::teardown(format!("remove VG {}", vg), &out.stderr));
    }
    Ok(())
}

pub fn remove_physical_volume<H: ProcessOps + ?Sized>(
    hal: &H,
    pv: &str,
    device: &str,
) -> CleanupResult<()> {
    let out = hal.execute("pvremove", &[pv, "-y", "-ff"])?;
    if !out.success() {
        return Err(CleanupError::teardown(
            format!("remove PV {} from disk {}", pv, device),
            &out.stderr,
        ));
    }
    Ok(())
}

/// Remove every VG and then every PV bound to `device`.
///
/// Stops at the first failed removal; whatever was already removed stays removed.
pub fn clean_lvm<H: ProcessOps + ?Sized>(hal: &H, device: &str) -> CleanupResult<()> {
    let vgs = volume_groups_on(hal, device)?;
    for vg in &vgs {
        log::info!("Removing volume group {} (on {})", vg, device);
        remove_volume_group(hal, vg)?;
    }

    let pvs = physical_volumes_on(hal, device)?;
    for pv in &pvs {
        log::info!("Removing physical volume {} (on {})", pv, device);
        remove_physical_volume(hal, pv, device)?;
    }

    if vgs.is_empty() && pvs.is_empty() {
        log::debug!("No LVM metadata found on {}", device);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_hal::FakeHal;

    const VGS: &str = "vgs --noheadings -o vg_name,pv_name";
    const PVS: &str = "pvs --noheadings -o pv_name";

    #[test]
    fn parses_vgs_rows_by_pv_substring() {
        let out = "  vg0   /dev/sda2\n  vg0   /dev/sda3\n  data  /dev/sdb\n  orphan\n\n";
        assert_eq!(parse_volume_groups(out, "/dev/sda"), vec!["vg0"]);
        assert_eq!(parse_volume_groups(out, "/dev/sdb"), vec!["data"]);
        assert!(parse_volume_groups(out, "/dev/sdc").is_empty());
    }

    #[test]
    fn parses_pvs_lines() {
        let out = "  /dev/sda1\n  /dev/sda2 \n  /dev/sdb\n";
        assert_eq!(
            parse_physical_volumes(out, "/dev/sda"),
            vec!["/dev/sda1", "/dev/sda2"]
        );
        assert!(parse_physical_volumes("", "/dev/sda").is_empty());
    }

    #[test]
    fn nothing_to_remove_issues_only_queries() {
        let hal = FakeHal::new();
        clean_lvm(&hal, "/dev/sda").unwrap();
        assert_eq!(hal.command_lines(), vec![VGS, PVS]);
    }

    #[test]
    fn removes_vgs_then_pvs() {
        let hal = FakeHal::new();
        hal.script_stdout(VGS, "  vg0 /dev/sda1\n  vg1 /dev/sda2\n");
        hal.script_stdout(PVS, "  /dev/sda1\n  /dev/sda2\n");

        clean_lvm(&hal, "/dev/sda").unwrap();

        assert_eq!(
            hal.command_lines(),
            vec![
                VGS,
                "vgremove vg0 -y",
                "vgremove vg1 -y",
                PVS,
                "pvremove /dev/sda1 -y -ff",
                "pvremove /dev/sda2 -y -ff",
            ]
        );
    }

    #[test]
    fn pvs_are_removed_even_without_vgs() {
        let hal = FakeHal::new();
        hal.script_stdout(PVS, "  /dev/sdb\n");

        clean_lvm(&hal, "/dev/sdb").unwrap();

        assert_eq!(
            hal.command_lines(),
            vec![VGS, PVS, "pvremove /dev/sdb -y -ff"]
        );
    }

    #[test]
    fn first_vg_failure_stops_teardown() {
        let hal = FakeHal::new();
        hal.script_stdout(VGS, "  vg0 /dev/sda1\n  vg1 /dev/sda2\n");
        hal.script_failure("vgremove vg0 -y", 5, "  Logical volume vg0/root in use.\n");

        let err = clean_lvm(&hal, "/dev/sda").unwrap_err();

        assert!(matches!(err, CleanupError::Teardown { .. }));
        assert!(err.to_string().contains("vg0"));
        assert!(err.to_string().contains("in use"));
        assert_eq!(hal.command_lines(), vec![VGS, "vgremove vg0 -y"]);
    }

    #[test]
    fn pv_failure_leaves_remaining_pvs() {
        let hal = FakeHal::new();
        hal.script_stdout(PVS, "  /dev/sda1\n  /dev/sda2\n");
        hal.script_failure("pvremove /dev/sda1 -y -ff", 5, "busy");

        let err = clean_lvm(&hal, "/dev/sda").unwrap_err();

        assert_eq!(err.to_string(), "Failed to remove PV /dev/sda1 from disk /dev/sda: busy");
        assert!(!hal
            .command_lines()
            .contains(&"pvremove /dev/sda2 -y -ff".to_string()));
    }

    #[test]
    fn listing_failure_is_a_query_error() {
        let hal = FakeHal::new();
        hal.script_failure(VGS, 3, "  /run/lvm/lvmetad.socket: connect failed\n");

        let err = clean_lvm(&hal, "/dev/sda").unwrap_err();

        assert!(matches!(err, CleanupError::Query { what: "VGs", .. }));
        assert!(err.to_string().contains("connect failed"));
        assert_eq!(hal.command_lines(), vec![VGS]);
    }
}
