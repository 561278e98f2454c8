use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "lingostreak-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_lingostreak-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("event-storm"));
}

#[test]
fn cli_runs_every_logic_scenario_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_lingostreak-tester");
    let output_path = temp_path("all");
    let output = Command::new(exe)
        .args([
            "--mode",
            "logic",
            "--scenarios",
            "all",
            "--seeds",
            "7,1337",
            "--iterations",
            "2",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read report"))
            .expect("json report");
    let runs = report.as_array().expect("array");
    assert_eq!(runs.len(), 13 * 2);
    assert!(runs.iter().all(|run| run["passed"] == true));
}

#[test]
fn cli_runs_with_unknown_browser() {
    let exe = env!("CARGO_BIN_EXE_lingostreak-tester");
    let output = Command::new(exe)
        .args([
            "--mode",
            "browser",
            "--browsers",
            "unknown",
            "--report",
            "markdown",
            "--scenarios",
            "smoke",
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Lingostreak Automated Tester"));
    assert!(stderr.contains("Unknown browser"));
}

#[test]
fn cli_rejects_bad_seeds() {
    let exe = env!("CARGO_BIN_EXE_lingostreak-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not-a-number"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid seed"));
}
