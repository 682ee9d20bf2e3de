// Non-interactive modes of the binary; these never need a TTY.

use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

const TWO_RUNS: &str = r#"[
    {"date":"2025-07-01T18:30:00.000Z","duration":30,"routeType":"Forest"},
    {"date":"2025-07-02T18:30:00.000Z","duration":75.4,"routeType":"Road"}
]"#;

#[test]
fn summary_prints_counts_and_averages() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("timers.json"), TWO_RUNS).unwrap();

    let output = Command::cargo_bin("trailtime")
        .unwrap()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--summary")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Travels: 2"));
    assert!(stdout.contains("Average: 52.7 s"));
    assert!(stdout.contains("Forest: 1 runs, avg 30.0 s"));
    assert!(stdout.contains("Road: 1 runs, avg 1:15.4"));
}

#[test]
fn summary_of_empty_data_dir() {
    let dir = tempdir().unwrap();

    let output = Command::cargo_bin("trailtime")
        .unwrap()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--summary")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Travels: 0"));
    assert!(stdout.contains("Average: 0.0 s"));
}

#[test]
fn export_writes_csv() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("timers.json"), TWO_RUNS).unwrap();
    let csv_path = dir.path().join("runs.csv");

    Command::cargo_bin("trailtime")
        .unwrap()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--export")
        .arg(&csv_path)
        .assert()
        .success();

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,duration,routeType");
    assert_eq!(lines.len(), 3);
    assert!(lines[2].ends_with(",75.4,Road"));
}

#[test]
fn interactive_mode_requires_a_tty() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("trailtime")
        .unwrap()
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .failure();
}
