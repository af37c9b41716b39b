use std::process::Command;

#[test]
fn test_help_lists_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_weather-decision"))
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--port"));
}

#[test]
fn test_invalid_port_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_weather-decision"))
        .args(["--port", "not-a-port"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}
