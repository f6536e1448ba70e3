//! End-to-end tests for the countdown binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn countdown() -> Command {
    Command::cargo_bin("countdown").unwrap()
}

#[test]
fn no_args_prints_help() {
    countdown()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn simulate_reports_reconciled_time() {
    countdown()
        .args(["simulate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"remainingMs\":80000"));
}

#[test]
fn simulate_text_output() {
    countdown()
        .args(["simulate", "-d", "60s", "-r", "5s", "-b", "15s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("00:40"));
}

#[test]
fn config_prints_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"duration_ms": 90000}"#).unwrap();

    countdown()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"duration_ms\": 90000"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    countdown()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("設定ファイルが見つかりません"));
}

#[test]
fn run_rejects_start_beyond_duration() {
    countdown()
        .args(["run", "--duration", "10s", "--start-at", "20s"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("開始位置"));
}

#[test]
fn run_counts_down_to_completion() {
    countdown()
        .args(["run", "--duration", "2s", "--json"])
        .write_stdin("")
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"remainingMs\":0"))
        .stdout(predicate::str::contains("\"status\":\"completed\""));
}

#[test]
fn run_quits_on_q() {
    countdown()
        .args(["run", "--duration", "10m", "--paused"])
        .write_stdin("q\n")
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("10:00"));
}

#[test]
fn run_paused_exits_when_input_closes() {
    countdown()
        .args(["run", "--duration", "3s", "--paused"])
        .write_stdin("")
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("00:03"));
}

#[test]
fn run_exits_when_stopped_and_input_closes() {
    countdown()
        .args(["run", "--duration", "10m", "--json"])
        .write_stdin("p\n")
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"completed\"").not());
}

#[cfg(unix)]
mod signal_tests {
    use std::io::{BufRead, BufReader, Write};
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::Duration;

    fn send_signal(pid: u32, signal: &str) {
        let status = Command::new("kill")
            .arg(format!("-{}", signal))
            .arg(pid.to_string())
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn usr_signals_background_and_reconcile() {
        let mut child = Command::new(assert_cmd::cargo::cargo_bin("countdown"))
            .args(["-v", "run", "--duration", "60s", "--json"])
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let mut stdout = BufReader::new(child.stdout.take().unwrap());
        let mut first = String::new();
        stdout.read_line(&mut first).unwrap();
        assert!(first.contains("\"remainingMs\":60000"));

        send_signal(child.id(), "USR1");
        thread::sleep(Duration::from_millis(300));
        send_signal(child.id(), "USR2");
        thread::sleep(Duration::from_millis(300));

        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(b"q\n").unwrap();
        drop(stdin);

        let rest: Vec<String> = stdout.lines().map(|line| line.unwrap()).collect();
        let output = child.wait_with_output().unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr);

        assert!(output.status.success());
        assert!(stderr.contains("Lifecycle signal received"));
        assert!(stderr.contains("Reconciled background time"));
        assert!(!rest.is_empty());
        assert!(rest.iter().all(|line| line.contains("\"status\":\"running\"")));
    }
}
