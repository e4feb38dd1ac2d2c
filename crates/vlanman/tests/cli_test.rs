//! Integration tests for the `vlanman` CLI binary.
//!
//! Parsing, help, completions and error mapping run without a backend;
//! everything else uses `--offline`, which seeds an in-memory plant.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `vlanman` binary with env isolation.
///
/// Clears the `VLANMAN_*` and deployment variables and points config
/// directories at a nonexistent path so tests never read a real config.
fn vlanman_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vlanman");
    cmd.env("HOME", "/tmp/vlanman-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/vlanman-cli-test-nonexistent")
        .env_remove("VLANMAN_PROFILE")
        .env_remove("VLANMAN_OUTPUT")
        .env_remove("VLANMAN_OFFLINE")
        .env_remove("VLANMAN_API_URL")
        .env_remove("API_URL")
        .env_remove("PLANT_CODE")
        .env_remove("ORGANIZATION")
        .env_remove("RUST_LOG");
    cmd
}

fn offline() -> assert_cmd::Command {
    let mut cmd = vlanman_cmd();
    cmd.args(["--offline", "--color", "never"]);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = vlanman_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    vlanman_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("VLAN")
            .and(predicate::str::contains("vlans"))
            .and(predicate::str::contains("ips"))
            .and(predicate::str::contains("reports")),
    );
}

#[test]
fn test_version_flag() {
    vlanman_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vlanman"));
}

#[test]
fn test_invalid_subcommand() {
    vlanman_cmd()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_completions_bash() {
    vlanman_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vlanman"));
}

#[test]
fn test_config_path() {
    vlanman_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Subnet preview (no backend) ─────────────────────────────────────

#[test]
fn test_preview_reserves_low_block() {
    vlanman_cmd()
        .args(["--color", "never", "vlans", "preview"])
        .args(["--vlan-id", "101", "--subnet", "10.1.1.0", "--netmask", "24"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("10.1.1.7 - 10.1.1.254")
                .and(predicate::str::contains("Total IPs:   248")),
        );
}

#[test]
fn test_preview_json_has_plan_fields() {
    let output = vlanman_cmd()
        .args(["-o", "json", "vlans", "preview"])
        .args(["--vlan-id", "20", "--subnet", "192.168.0.0", "--netmask", "255.255.255.0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["vlan_id"], 20);
    assert_eq!(value["gateway"], "192.168.0.1");
}

#[test]
fn test_preview_rejects_out_of_range_tag() {
    vlanman_cmd()
        .args(["vlans", "preview", "--vlan-id", "5000"])
        .args(["--subnet", "10.1.1.0", "--netmask", "24"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("vlan_id"));
}

// ── Offline plant ───────────────────────────────────────────────────

#[test]
fn test_offline_vlan_list_plain() {
    offline()
        .args(["-o", "plain", "vlans", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("101").and(predicate::str::contains("503")));
}

#[test]
fn test_offline_vlan_list_by_domain() {
    let output = offline()
        .args(["-o", "plain", "vlans", "list", "--domain", "FCM"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let tags: Vec<&str> = stdout.lines().collect();
    assert_eq!(tags, ["301", "302", "303"]);
}

#[test]
fn test_offline_ips_list() {
    offline()
        .args(["ips", "list", "--vlan", "101"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("PLC-A2-MAIN")
                .and(predicate::str::contains("WMS-LOG21-SRV").not()),
        );
}

#[test]
fn test_offline_next_ip_skips_taken_addresses() {
    offline()
        .args(["-o", "plain", "vlans", "next-ip", "101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.1.1.7"));
}

#[test]
fn test_offline_compliance_summary() {
    offline()
        .args(["reports", "compliance"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Plant BURSA")
                .and(predicate::str::contains("5 of 13 zones overdue")),
        );
}

#[test]
fn test_offline_health() {
    offline()
        .args(["-o", "plain", "health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("healthy"));
}

#[test]
fn test_offline_delete_requires_yes() {
    offline()
        .args(["vlans", "delete", "101"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("confirmation"));
}

#[test]
fn test_offline_duplicate_vlan_is_conflict() {
    offline()
        .args(["vlans", "create", "--zone", "zone-a2", "--vlan-id", "101"])
        .args(["--subnet", "10.9.9.0", "--netmask", "24"])
        .assert()
        .code(6);
}

#[test]
fn test_offline_reserved_address_is_conflict() {
    offline()
        .args(["ips", "assign", "--vlan", "101", "--ip", "10.1.1.3"])
        .args(["--ci-name", "PLC-A2-SPARE"])
        .assert()
        .code(6);
}

#[test]
fn test_offline_unknown_vlan_is_not_found() {
    offline()
        .args(["vlans", "get", "999"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("999"));
}

#[test]
fn test_offline_record_check_by_zone_name() {
    offline()
        .args(["reports", "record-check", "analyzer zone"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Analyzer Zone"));
}

// ── Zones and value streams ─────────────────────────────────────────

#[test]
fn test_offline_zones_list_by_domain() {
    let output = offline()
        .args(["-o", "plain", "zones", "list", "--domain", "LOG"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Logistics Zone 21"));
    assert!(!stdout.contains("Analyzer Zone"));
}

#[test]
fn test_offline_streams_lists_codes() {
    offline()
        .args(["-o", "plain", "zones", "streams", "MFG"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A2").and(predicate::str::contains("MCO")));
}

#[test]
fn test_offline_zone_create_under_value_stream() {
    offline()
        .args(["zones", "create", "--domain", "mfg", "--value-stream", "a2"])
        .args(["--name", "Paint Shop", "--security-type", "mfz_sl4"])
        .args(["--manager", "Jonas Richter"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Zone Paint Shop created in MFG/A2"));
}

#[test]
fn test_offline_zone_create_unknown_value_stream() {
    offline()
        .args(["zones", "create", "--domain", "MFG", "--value-stream", "LOG21"])
        .args(["--name", "Paint Shop", "--security-type", "MFZ_SL4"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("LOG21"));
}

#[test]
fn test_offline_zone_create_rejects_security_type() {
    offline()
        .args(["zones", "create", "--domain", "MFG", "--value-stream", "A2"])
        .args(["--name", "Paint Shop", "--security-type", "SL9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("security-type"));
}

#[test]
fn test_offline_add_stream() {
    offline()
        .args(["zones", "add-stream", "--domain", "ENG", "--code", "LAB2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Value stream LAB2 added to ENG"));
}

#[test]
fn test_offline_duplicate_stream_code_is_conflict() {
    offline()
        .args(["zones", "add-stream", "--domain", "MFG", "--code", "a2"])
        .assert()
        .code(6);
}
