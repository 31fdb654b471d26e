//! Runs the `ibc` binary for subcommands that need no solver.

use std::process::Command;

fn ibc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ibc"))
}

#[test]
fn dump_smt_prints_a_complete_script() {
    let output = ibc()
        .args(["dump-smt", "--system", "linear-1d", "--k", "2"])
        .output()
        .expect("binary runs");
    assert!(output.status.success());
    let script = String::from_utf8(output.stdout).expect("utf-8");
    assert!(script.contains("(set-logic NRA)"));
    assert!(script.contains("(declare-const c_k02_b002_m001 Real)"));
    assert!(script.contains("(check-sat)"));
}

#[test]
fn dump_smt_writes_to_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lv_k1.smt2");
    let status = ibc()
        .args(["dump-smt", "--system", "lotka-volterra", "--output"])
        .arg(&path)
        .status()
        .expect("binary runs");
    assert!(status.success());
    let script = std::fs::read_to_string(&path).expect("script written");
    assert_eq!(script.matches("(declare-const").count(), 20);
}

#[test]
fn unknown_system_fails() {
    let output = ibc()
        .args(["dump-smt", "--system", "van-der-pol"])
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown system"));
}

#[test]
fn inverted_region_in_config_fails_before_solving() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("bad.json");
    std::fs::write(
        &config,
        r#"{"k_max": 1, "initial_region": [2.3, 2.0], "unsafe_region": [1.6, 1.9], "state_space": [0.0, 3.0]}"#,
    )
    .expect("write config");
    let output = ibc()
        .args(["search", "--config"])
        .arg(&config)
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("low 2.3 greater than high 2"));
}
