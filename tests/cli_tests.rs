use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const MISSING_PORT: &str = "/dev/devicectl-missing";

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("device_defaults.json");
    fs::write(&path, body).unwrap();
    path
}

fn run_dispatch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dispatch"))
        .args(args)
        .env("RUST_LOG", "debug")
        .output()
        .expect("dispatch runs")
}

/// Stdout must hold exactly one JSON document on one line.
fn result_line(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout: {:?}", stdout);
    serde_json::from_str(lines[0]).unwrap()
}

#[test]
fn unknown_device_prints_failure_and_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "{}");
    let output = run_dispatch(&[
        "--config",
        config.to_str().unwrap(),
        "--device",
        "unknown",
        "--action",
        "turn_on",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        result_line(&output),
        json!({"ok": false, "error": "Unknown device 'unknown' and no overrides provided",
               "device": "unknown", "action": "turn_on"})
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Can't dispatch unknown/turn_on"));
}

#[test]
fn malformed_config_is_a_json_failure() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "{\"lamp\": ");
    let output = run_dispatch(&[
        "--config",
        config.to_str().unwrap(),
        "--device",
        "lamp",
        "--action",
        "turn_on",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let result = result_line(&output);
    assert_eq!(result["ok"], json!(false));
    assert_eq!(result["device"], json!("lamp"));
    assert!(result["error"]
        .as_str()
        .unwrap()
        .starts_with("Malformed config file"));
}

#[test]
fn missing_explicit_config_is_a_json_failure() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nope.json");
    let output = run_dispatch(&[
        "--config",
        config.to_str().unwrap(),
        "--device",
        "lamp",
        "--action",
        "turn_on",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let error = result_line(&output)["error"].as_str().unwrap().to_string();
    assert!(error.ends_with("not found"), "{}", error);
}

#[test]
fn list_prints_devices_and_actions() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"{"lamp": {"port": "/dev/ttyUSB0", "payloads": {"turn_on": "3101", "turn_off": "3100"}},
            "alarm": {"payloads": {"turn_on": "6101"}}}"#,
    );
    let output = run_dispatch(&["--config", config.to_str().unwrap(), "--list"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        result_line(&output),
        json!({"alarm": ["turn_on"], "lamp": ["turn_off", "turn_on"]})
    );
}

#[test]
fn transport_failure_echoes_resolved_fields() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"{"lamp": {"port": "/dev/ttyUSB0", "baudrate": 9600, "payloads": {"turn_on": "3101"}}}"#,
    );
    let output = run_dispatch(&[
        "--config",
        config.to_str().unwrap(),
        "--device",
        "lamp",
        "--action",
        "turn_on",
        "--port",
        MISSING_PORT,
    ]);

    assert_eq!(output.status.code(), Some(1));
    let result = result_line(&output);
    assert_eq!(result["ok"], json!(false));
    assert_eq!(result["port"], json!(MISSING_PORT));
    assert_eq!(result["baudrate"], json!(9600));
    assert_eq!(result["payload"], json!("3101"));
    assert!(!result["error"].as_str().unwrap().is_empty());
}

#[cfg(target_os = "linux")]
#[test]
fn mark_and_space_parity_reach_the_driver() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"lamp": {"payloads": {"turn_on": "3101"}}}"#);
    for parity in ["M", "S"] {
        let output = run_dispatch(&[
            "--config",
            config.to_str().unwrap(),
            "--device",
            "lamp",
            "--action",
            "turn_on",
            "--port",
            MISSING_PORT,
            "--parity",
            parity,
        ]);

        assert_eq!(output.status.code(), Some(1));
        let error = result_line(&output)["error"].as_str().unwrap().to_string();
        assert!(!error.contains("not supported"), "{}", error);
    }
}

#[test]
fn sendtest_reports_failure_on_stderr() {
    let output = Command::new(env!("CARGO_BIN_EXE_sendtest"))
        .args(["lights", "on", "--port", MISSING_PORT])
        .output()
        .expect("sendtest runs");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Can't send 'lights:on'"), "{}", stderr);
}
