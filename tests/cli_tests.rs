use std::process::Command;

#[test]
fn test_demo_binary_logs_to_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_fmtlog"))
        .env("FMTLOG_COLOR", "never")
        .env_remove("FMTLOG_LEVEL")
        .env_remove("FMTLOG_FILTER")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.iter().any(|l| l.starts_with("[INFO ") && l.ends_with("\tcart has 3 items")));
    assert!(lines.iter().any(|l| l.starts_with("[WARN ") && l.ends_with("\tdisk sda at 93%")));
    assert!(lines.iter().any(|l| l.ends_with("\trouted through the log facade")));
    assert!(!stdout.contains('\x1b'));
}
