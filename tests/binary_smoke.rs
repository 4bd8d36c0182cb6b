// use macro form directly; no import needed
use std::process::Command;
use tempfile::tempdir;

fn ntinterop() -> Command {
    let me = assert_cmd::cargo::cargo_bin!("ntinterop");
    let mut cmd = Command::new(me);
    // Keep the user's real config out of the way.
    let td = std::env::temp_dir().join("ntinterop-smoke-absent.xml");
    cmd.env("NTINTEROP_CONFIG", td);
    cmd
}

#[test]
fn binary_print_config_succeeds() {
    let out = ntinterop()
        .arg("--print-config")
        .output()
        .expect("spawn binary");
    assert!(out.status.success(), "binary should succeed with --print-config");
    assert!(String::from_utf8_lossy(&out.stdout).contains("NTINTEROP_CONFIG"));
}

#[test]
fn resolve_prints_the_extended_form() {
    let long = format!(r"C:\{}", "n".repeat(300));
    let out = ntinterop()
        .args(["resolve", "--format", "full"])
        .arg(&long)
        .output()
        .expect("spawn binary");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), format!(r"\\?\{long}"));
}

#[test]
fn resolve_device_designator() {
    let out = ntinterop()
        .args(["resolve", "--device", "PhysicalDrive1"])
        .output()
        .expect("spawn binary");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), r"\\.\PhysicalDrive1");
}

#[test]
fn invalid_path_exits_with_its_kind_code() {
    let out = ntinterop()
        .args(["resolve", "--format", "full", r"C:\bad|name"])
        .output()
        .expect("spawn binary");
    assert_eq!(out.status.code(), Some(10));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid path"));
}

#[test]
fn transacted_network_path_is_refused() {
    let out = ntinterop()
        .args(["resolve", "--format", "full", "--transacted", r"\\srv\share\x"])
        .output()
        .expect("spawn binary");
    assert_eq!(out.status.code(), Some(10));
}

#[test]
fn invalid_config_value_fails_before_running() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("config.xml");
    std::fs::write(&cfg, "<config><max_attempts>0</max_attempts></config>").unwrap();
    let out = Command::new(assert_cmd::cargo::cargo_bin!("ntinterop"))
        .env("NTINTEROP_CONFIG", &cfg)
        .args(["resolve", "--format", "full", r"C:\x"])
        .output()
        .expect("spawn binary");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("max_attempts"));
}

#[test]
fn cli_override_beats_config_value() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("config.xml");
    std::fs::write(&cfg, "<config><max_attempts>0</max_attempts></config>").unwrap();
    let out = Command::new(assert_cmd::cargo::cargo_bin!("ntinterop"))
        .env("NTINTEROP_CONFIG", &cfg)
        .args(["--max-attempts", "4", "resolve", "--format", "full", r"C:\x"])
        .output()
        .expect("spawn binary");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[cfg(not(windows))]
#[test]
fn native_subcommands_need_windows() {
    let out = ntinterop()
        .args(["disk-info", "0"])
        .output()
        .expect("spawn binary");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Windows"));
}
