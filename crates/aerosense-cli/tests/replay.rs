use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const FLEET_REPLY: &str = "N412AS is AOG at KDEN ✈, oil temp 118°C.";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn replay(name: &str, extra: &[&str]) -> assert_cmd::assert::Assert {
    let home = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("aerosense")
        .env("AEROSENSE_HOME", home.path())
        .arg("replay")
        .arg(fixture(name))
        .args(extra)
        .assert()
}

#[test]
fn test_replay_whole_body() {
    replay("fleet_reply.sse", &[])
        .success()
        .stdout(format!("{FLEET_REPLY}\n"));
}

#[test]
fn test_replay_byte_by_byte_matches_whole_body() {
    replay("fleet_reply.sse", &["--chunk-size", "1"])
        .success()
        .stdout(format!("{FLEET_REPLY}\n"));
}

#[test]
fn test_replay_odd_chunks_match_whole_body() {
    for size in ["3", "7", "64"] {
        replay("fleet_reply.sse", &["--chunk-size", size])
            .success()
            .stdout(format!("{FLEET_REPLY}\n"));
    }
}

#[test]
fn test_replay_updates_show_running_text() {
    replay("fleet_reply.sse", &["--chunk-size", "5", "--updates"])
        .success()
        .stdout(concat!(
            "N412AS is \n",
            "N412AS is AOG at KDEN ✈\n",
            "N412AS is AOG at KDEN ✈, oil temp 118°C.\n",
        ));
}

#[test]
fn test_replay_flushes_unterminated_last_line() {
    replay("unterminated.sse", &["--chunk-size", "2"])
        .success()
        .stdout("Next inspection due in 40 hours.\n");
}

#[test]
fn test_replay_rejects_zero_chunk_size() {
    replay("fleet_reply.sse", &["--chunk-size", "0"])
        .failure()
        .stderr(predicate::str::contains("--chunk-size must be at least 1"));
}

#[test]
fn test_replay_missing_file() {
    replay("does_not_exist.sse", &[])
        .failure()
        .stderr(predicate::str::contains("does_not_exist.sse"));
}

#[test]
fn test_replay_ignores_broken_config() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join("config.toml"), "greeting = [").unwrap();

    cargo_bin_cmd!("aerosense")
        .env("AEROSENSE_HOME", home.path())
        .arg("replay")
        .arg(fixture("unterminated.sse"))
        .assert()
        .success()
        .stdout("Next inspection due in 40 hours.\n");
}
