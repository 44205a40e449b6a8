//! End-to-end integration tests for the complete expense-splitting flow.
//!
//! Tests the full pipeline: split → save → list → show, plus the friends
//! directory, by spawning the real binary against a temp database.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn ash_binary() -> String {
    env!("CARGO_BIN_EXE_ash").to_string()
}

/// Write a config file pointing at a database inside the temp directory.
fn write_config(temp: &Path) -> std::path::PathBuf {
    let db_file = temp.join("ash.db");
    let config_file = temp.join("config.toml");
    std::fs::write(
        &config_file,
        format!(r#"database_path = "{}""#, db_file.display()),
    )
    .unwrap();
    config_file
}

fn run(config_file: &Path, args: &[&str]) -> Output {
    Command::new(ash_binary())
        .arg("--config")
        .arg(config_file)
        .args(args)
        .output()
        .expect("failed to run ash")
}

#[test]
fn test_split_proportional_breakdown() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(
        &config,
        &[
            "split",
            "--total",
            "600",
            "--participant",
            "Ana:3",
            "--participant",
            "Bruno:2",
        ],
    );

    assert!(
        output.status.success(),
        "split should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("360.00"), "Ana pays 3/5 of 600: {stdout}");
    assert!(stdout.contains("240.00"), "Bruno pays 2/5 of 600: {stdout}");
    assert!(stdout.contains("EXPENSE BREAKDOWN (individual)"));
}

#[test]
fn test_split_json_output_is_parseable() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(
        &config,
        &[
            "split",
            "--total",
            "100",
            "--mode",
            "equal",
            "--participant",
            "Ana:3",
            "--participant",
            "Bruno:2",
            "--json",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let results: serde_json::Value =
        serde_json::from_str(&stdout).expect("JSON output should be valid JSON");
    let results = results.as_array().expect("results should be an array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["baseShare"].as_f64(), Some(50.0));
    assert_eq!(results[1]["totalShare"].as_f64(), Some(50.0));
    assert_eq!(results[0]["name"].as_str(), Some("Ana"));
}

#[test]
fn test_split_save_then_list_and_show() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(
        &config,
        &[
            "split",
            "--total",
            "600",
            "--participant",
            "Ana:3",
            "--participant",
            "Bruno:2",
            "--surcharge",
            "cleaning:20:divided",
            "--save",
            "beach house",
        ],
    );
    assert!(
        output.status.success(),
        "save should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Saved session "))
        .expect("should print the saved session ID")
        .trim()
        .to_string();

    let list = run(&config, &["sessions", "list"]);
    assert!(list.status.success());
    let list_stdout = String::from_utf8_lossy(&list.stdout);
    assert!(list_stdout.contains("beach house"), "{list_stdout}");
    assert!(list_stdout.contains("620.00") || list_stdout.contains("600.00"));

    let show = run(&config, &["sessions", "show", &id]);
    assert!(
        show.status.success(),
        "show should succeed: {}",
        String::from_utf8_lossy(&show.stderr)
    );
    let show_stdout = String::from_utf8_lossy(&show.stdout);
    assert!(show_stdout.contains("beach house"));
    assert!(show_stdout.contains("+ cleaning (divided): 10.00"));
    assert!(show_stdout.contains("370.00"), "Ana total: {show_stdout}");
}

#[test]
fn test_sessions_show_accepts_id_prefix() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(
        &config,
        &[
            "split",
            "--total",
            "100",
            "--participant",
            "Ana:1",
            "--save",
            "quick",
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Saved session "))
        .unwrap()
        .trim();

    let show = run(&config, &["sessions", "show", &id[..8]]);
    assert!(
        show.status.success(),
        "prefix lookup should succeed: {}",
        String::from_utf8_lossy(&show.stderr)
    );
    assert!(String::from_utf8_lossy(&show.stdout).contains("quick"));
}

#[test]
fn test_split_rejects_non_positive_total() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(
        &config,
        &["split", "--total", "0", "--participant", "Ana:1"],
    );
    assert!(!output.status.success(), "zero total should fail");

    let output = run(
        &config,
        &["split", "--total", "-5", "--participant", "Ana:1"],
    );
    assert!(!output.status.success(), "negative total should fail");
}

#[test]
fn test_split_rejects_all_invalid_participants() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    // Blank name and zero days are both filtered out, leaving nobody.
    let output = run(
        &config,
        &[
            "split",
            "--total",
            "100",
            "--participant",
            " :3",
            "--participant",
            "Ana:0",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("participant"),
        "should mention participants: {stderr}"
    );
}

#[test]
fn test_sessions_show_unknown_id_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(&config, &["sessions", "show", "does-not-exist"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does-not-exist"), "{stderr}");
}

#[test]
fn test_friends_add_list_remove_flow() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(
        &config,
        &[
            "friends",
            "add",
            "--name",
            "Ana",
            "--surname",
            "Silva",
            "--email",
            "ana@example.com",
            "--birth-date",
            "1990-08-02",
        ],
    );
    assert!(
        output.status.success(),
        "add should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Added friend "))
        .expect("should print the new friend ID")
        .trim()
        .to_string();

    let list = run(&config, &["friends", "list"]);
    assert!(list.status.success());
    let list_stdout = String::from_utf8_lossy(&list.stdout);
    assert!(list_stdout.contains("Ana Silva"), "{list_stdout}");
    assert!(list_stdout.contains("ana@example.com"));

    let remove = run(&config, &["friends", "remove", &id]);
    assert!(remove.status.success());

    let list = run(&config, &["friends", "list"]);
    let list_stdout = String::from_utf8_lossy(&list.stdout);
    assert!(list_stdout.contains("No friends yet."), "{list_stdout}");
}

#[test]
fn test_friends_list_json_orders_by_upcoming_birthday() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    // One birthday far away, one soon (relative to any date): use dates six
    // months apart so exactly one of them is within the next half year.
    for (name, birth_date) in [("January", "1990-01-15"), ("July", "1990-07-15")] {
        let output = run(
            &config,
            &[
                "friends",
                "add",
                "--name",
                name,
                "--surname",
                "Test",
                "--email",
                "t@example.com",
                "--birth-date",
                birth_date,
            ],
        );
        assert!(output.status.success());
    }

    let list = run(&config, &["friends", "list", "--json"]);
    assert!(list.status.success());
    let friends: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&list.stdout)).unwrap();
    let friends = friends.as_array().unwrap();
    assert_eq!(friends.len(), 2);
    assert!(friends[0]["birthDate"].is_string());
}

#[test]
fn test_friends_add_rejects_bad_birth_date() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(
        &config,
        &[
            "friends",
            "add",
            "--name",
            "Ana",
            "--surname",
            "Silva",
            "--email",
            "ana@example.com",
            "--birth-date",
            "02/08/1990",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("birth date"), "{stderr}");
}

#[test]
fn test_friends_remove_unknown_id_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = run(&config, &["friends", "remove", "nope"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope"));
}

#[test]
fn test_database_persists_across_invocations() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    for name in ["first", "second"] {
        let output = run(
            &config,
            &[
                "split",
                "--total",
                "50",
                "--participant",
                "Ana:1",
                "--save",
                name,
            ],
        );
        assert!(output.status.success());
    }

    let list = run(&config, &["sessions", "list", "--json"]);
    assert!(list.status.success());
    let sessions: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&list.stdout)).unwrap();
    assert_eq!(sessions.as_array().unwrap().len(), 2);
}
