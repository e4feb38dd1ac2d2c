// ── Status derivation ──
//
// The single implementation of every computed field: device status,
// device type inference, utilization and VLAN status. The store, the
// backends, the reports and the CLI all call into here.

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{DeviceStatus, DeviceType, IpAssignment, VlanStatus, VlanUsage};

/// A device not seen for longer than this is inactive.
pub const INACTIVE_AFTER: TimeDelta = TimeDelta::hours(24);

/// Utilization strictly above this percentage raises a VLAN warning.
pub const UTILIZATION_WARNING_PCT: u32 = 85;

/// Ordered keyword table for device-type inference. First match wins.
const DEVICE_KEYWORDS: &[(&str, DeviceType)] = &[
    ("plc", DeviceType::Plc),
    ("hmi", DeviceType::Hmi),
    ("robot", DeviceType::RobotController),
    ("camera", DeviceType::VisionSystem),
    ("sensor", DeviceType::Sensor),
    ("gateway", DeviceType::Gateway),
    ("switch", DeviceType::Switch),
    ("server", DeviceType::Server),
    ("srv", DeviceType::Server),
    ("analyzer", DeviceType::Analyzer),
    ("testbench", DeviceType::TestEquipment),
];

// ── Device ───────────────────────────────────────────────────────────

/// Derive the display status of `assignment`.
///
/// `siblings` are the other assignments of the same VLAN (the assignment
/// itself may be included; it is skipped by id). Precedence: reserved,
/// conflict, inactive, active. A conflict reported by the backend on any
/// record of the VLAN marks every record of that VLAN.
pub fn device_status<'a>(
    assignment: &IpAssignment,
    siblings: impl IntoIterator<Item = &'a IpAssignment>,
    now: DateTime<Utc>,
) -> DeviceStatus {
    if assignment.is_reserved() {
        return DeviceStatus::Reserved;
    }
    if assignment.reported_status == Some(DeviceStatus::Conflict)
        || siblings
            .into_iter()
            .any(|other| reports_conflict(assignment, other) || conflicts_with(assignment, other))
    {
        return DeviceStatus::Conflict;
    }
    if now - assignment.last_activity() > INACTIVE_AFTER {
        return DeviceStatus::Inactive;
    }
    DeviceStatus::Active
}

/// The backend flagged another record of the same VLAN as conflicting.
fn reports_conflict(assignment: &IpAssignment, other: &IpAssignment) -> bool {
    other.id != assignment.id
        && other.vlan_id == assignment.vlan_id
        && other.reported_status == Some(DeviceStatus::Conflict)
}

/// Another live record on the same VLAN claims the same IP or MAC.
fn conflicts_with(assignment: &IpAssignment, other: &IpAssignment) -> bool {
    if other.id == assignment.id || other.vlan_id != assignment.vlan_id || !other.is_active {
        return false;
    }
    let same_ip = other.ip_address == assignment.ip_address;
    let same_mac = match (&assignment.mac_address, &other.mac_address) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    same_ip || same_mac
}

/// Case-insensitive keyword match on the device name.
pub fn infer_device_type(name: &str) -> DeviceType {
    let lowered = name.to_lowercase();
    DEVICE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map_or(DeviceType::Unknown, |(_, kind)| *kind)
}

/// The explicit type if one was chosen, otherwise the inferred one.
pub fn resolve_device_type(assignment: &IpAssignment) -> DeviceType {
    assignment
        .device_type
        .unwrap_or_else(|| infer_device_type(&assignment.ci_name))
}

// ── VLAN ─────────────────────────────────────────────────────────────

/// `round(used / total * 100)` with halves rounded up; 0 for an empty
/// pool, capped at 100.
pub fn utilization(used: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let used = u64::from(used);
    let total = u64::from(total);
    let pct = (used * 200 + total) / (total * 2);
    u32::try_from(pct.min(100)).unwrap_or(100)
}

/// Precedence: any conflict → error, utilization above 85 → warning,
/// any assignment → active, otherwise inactive.
pub fn vlan_status(
    device_statuses: impl IntoIterator<Item = DeviceStatus>,
    utilization: u32,
    assignment_count: usize,
) -> VlanStatus {
    if device_statuses
        .into_iter()
        .any(|s| s == DeviceStatus::Conflict)
    {
        VlanStatus::Error
    } else if utilization > UTILIZATION_WARNING_PCT {
        VlanStatus::Warning
    } else if assignment_count > 0 {
        VlanStatus::Active
    } else {
        VlanStatus::Inactive
    }
}

/// Usage of a VLAN whose pool holds `total_ips` addresses, from the
/// assignments that belong to it. Released (inactive) records do not
/// count.
pub fn vlan_usage(total_ips: u32, assignments: &[&IpAssignment], now: DateTime<Utc>) -> VlanUsage {
    let live: Vec<&IpAssignment> = assignments.iter().copied().filter(|a| a.is_active).collect();
    let used_ips = u32::try_from(live.len()).unwrap_or(u32::MAX);
    let utilization = utilization(used_ips, total_ips);
    let statuses = live
        .iter()
        .map(|a| device_status(a, live.iter().copied(), now));
    VlanUsage {
        used_ips,
        total_ips,
        utilization,
        status: vlan_status(statuses, utilization, live.len()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{EntityId, MacAddress};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    fn no_siblings() -> [&'static IpAssignment; 0] {
        []
    }

    fn assignment(id: &str, ip: &str, seen_hours_ago: i64) -> IpAssignment {
        IpAssignment {
            id: EntityId::from(id),
            vlan_id: EntityId::from("vlan-101"),
            ip_address: ip.parse().unwrap(),
            ci_name: "PLC-A2-MAIN".into(),
            mac_address: None,
            description: None,
            device_type: None,
            reported_status: None,
            is_active: true,
            assigned_at: None,
            last_seen: Some(now() - TimeDelta::hours(seen_hours_ago)),
            created_at: now() - TimeDelta::days(90),
            updated_at: None,
        }
    }

    // ── device_status ──

    #[test]
    fn reserved_wins_regardless_of_last_seen() {
        let a = assignment("a", "192.168.1.5", 500);
        assert!(a.is_reserved());
        assert_eq!(device_status(&a, no_siblings(), now()), DeviceStatus::Reserved);
    }

    #[test]
    fn stale_device_is_inactive() {
        let a = assignment("a", "10.1.1.20", 25);
        assert_eq!(device_status(&a, no_siblings(), now()), DeviceStatus::Inactive);
    }

    #[test]
    fn exactly_24_hours_is_still_active() {
        let a = assignment("a", "10.1.1.20", 24);
        assert_eq!(device_status(&a, no_siblings(), now()), DeviceStatus::Active);
    }

    #[test]
    fn duplicate_ip_on_same_vlan_is_conflict() {
        let a = assignment("a", "10.1.1.20", 1);
        let b = assignment("b", "10.1.1.20", 1);
        let c = assignment("c", "10.1.1.21", 1);
        assert_eq!(device_status(&a, [&a, &b, &c], now()), DeviceStatus::Conflict);
        assert_eq!(device_status(&c, [&a, &b, &c], now()), DeviceStatus::Active);
    }

    #[test]
    fn duplicate_mac_is_conflict_but_released_sibling_is_not() {
        let mac = MacAddress::parse("00:1B:21:A2:01:01").unwrap();
        let mut a = assignment("a", "10.1.1.20", 1);
        a.mac_address = Some(mac.clone());
        let mut b = assignment("b", "10.1.1.30", 1);
        b.mac_address = Some(mac);
        assert_eq!(device_status(&a, [&b], now()), DeviceStatus::Conflict);

        b.is_active = false;
        assert_eq!(device_status(&a, [&b], now()), DeviceStatus::Active);
    }

    #[test]
    fn reported_conflict_is_kept() {
        let mut a = assignment("a", "10.1.1.20", 1);
        a.reported_status = Some(DeviceStatus::Conflict);
        assert_eq!(device_status(&a, no_siblings(), now()), DeviceStatus::Conflict);
    }

    #[test]
    fn conflict_reported_on_vlan_mate_marks_the_vlan() {
        let a = assignment("a", "10.1.1.20", 1);
        let mut b = assignment("b", "10.1.1.30", 1);
        b.reported_status = Some(DeviceStatus::Conflict);
        assert_eq!(device_status(&a, [&a, &b], now()), DeviceStatus::Conflict);

        b.vlan_id = EntityId::from("vlan-102");
        assert_eq!(device_status(&a, [&a, &b], now()), DeviceStatus::Active);
    }

    #[test]
    fn status_is_idempotent() {
        let a = assignment("a", "10.1.1.20", 30);
        let b = assignment("b", "10.1.1.21", 2);
        let first = device_status(&a, [&b], now());
        let second = device_status(&a, [&b], now());
        assert_eq!(first, second);
    }

    #[test]
    fn missing_last_seen_falls_back_to_updated_then_created() {
        let mut a = assignment("a", "10.1.1.20", 0);
        a.last_seen = None;
        assert_eq!(device_status(&a, no_siblings(), now()), DeviceStatus::Inactive);
        a.updated_at = Some(now() - TimeDelta::hours(3));
        assert_eq!(device_status(&a, no_siblings(), now()), DeviceStatus::Active);
    }

    // ── infer_device_type ──

    #[test]
    fn keyword_order_decides_ties() {
        assert_eq!(infer_device_type("GATEWAY-SWITCH-01"), DeviceType::Gateway);
        assert_eq!(infer_device_type("plc-hmi-combo"), DeviceType::Plc);
    }

    #[test]
    fn keyword_table() {
        let cases = [
            ("PLC-A2-MAIN", DeviceType::Plc),
            ("HMI-A2-OP1", DeviceType::Hmi),
            ("ROBOT-A2-R1", DeviceType::RobotController),
            ("CAMERA-SEC-001", DeviceType::VisionSystem),
            ("Temp-Sensor-7", DeviceType::Sensor),
            ("core-switch", DeviceType::Switch),
            ("NEXEED-MES-SERVER", DeviceType::Server),
            ("WMS-LOG21-SRV", DeviceType::Server),
            ("ANALYZER-QC-001", DeviceType::Analyzer),
            ("TESTBENCH-TB001", DeviceType::TestEquipment),
            ("AGV-LOG21-001", DeviceType::Unknown),
        ];
        for (name, expected) in cases {
            assert_eq!(infer_device_type(name), expected, "{name}");
        }
    }

    #[test]
    fn explicit_type_overrides_inference() {
        let mut a = assignment("a", "10.1.1.20", 1);
        a.ci_name = "AGV-001".into();
        assert_eq!(resolve_device_type(&a), DeviceType::Unknown);
        a.device_type = Some(DeviceType::Sensor);
        assert_eq!(resolve_device_type(&a), DeviceType::Sensor);
    }

    // ── utilization / vlan_status ──

    #[test]
    fn utilization_rounds_half_up() {
        assert_eq!(utilization(0, 0), 0);
        assert_eq!(utilization(211, 248), 85);
        assert_eq!(utilization(212, 248), 85);
        assert_eq!(utilization(1, 8), 13);
        assert_eq!(utilization(1, 200), 1);
        assert_eq!(utilization(300, 248), 100);
    }

    #[test]
    fn warning_boundary_is_strict() {
        assert_eq!(vlan_status([DeviceStatus::Active], 85, 211), VlanStatus::Active);
        assert_eq!(vlan_status([DeviceStatus::Active], 86, 213), VlanStatus::Warning);
    }

    #[test]
    fn vlan_status_precedence() {
        assert_eq!(
            vlan_status([DeviceStatus::Active, DeviceStatus::Conflict], 99, 2),
            VlanStatus::Error
        );
        assert_eq!(vlan_status([DeviceStatus::Inactive], 1, 1), VlanStatus::Active);
        assert_eq!(vlan_status(Vec::new(), 0, 0), VlanStatus::Inactive);
    }

    #[test]
    fn usage_ignores_released_assignments() {
        let a = assignment("a", "10.1.1.20", 1);
        let mut b = assignment("b", "10.1.1.21", 1);
        b.is_active = false;
        let usage = vlan_usage(248, &[&a, &b], now());
        assert_eq!(usage.used_ips, 1);
        assert_eq!(usage.utilization, 0);
        assert_eq!(usage.status, VlanStatus::Active);
    }
}
