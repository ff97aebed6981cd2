//! End-to-end tests for the `semaphore` binary's operating modes.

use assert_cmd::Command;
use predicates::prelude::*;
use semaphore_config::configuration::ConfigDocument;
use semaphore_config::password::verify_password;

fn semaphore() -> Command {
    let mut command = Command::cargo_bin("semaphore").expect("semaphore binary is built");
    command.env_remove("PORT").env("RUST_LOG", "warn");
    command
}

#[test]
fn print_config_outputs_example_document() {
    let output = semaphore()
        .arg("-printConfig")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""port": ":3000""#))
        .get_output()
        .stdout
        .clone();

    let document = ConfigDocument::from_json_slice(&output).expect("valid JSON document");
    assert!(!document.cookie_hash.is_empty());
    assert!(!document.cookie_encryption.is_empty());
    assert_eq!(document.mysql.hostname, "127.0.0.1:3306");
    #[cfg(unix)]
    assert_eq!(document.tmp_path, "/tmp/semaphore");
}

#[test]
fn print_config_generates_fresh_secrets_each_time() {
    let first = semaphore().arg("-printConfig").output().unwrap().stdout;
    let second = semaphore().arg("--printConfig").output().unwrap().stdout;

    let first = ConfigDocument::from_json_slice(&first).unwrap();
    let second = ConfigDocument::from_json_slice(&second).unwrap();
    assert_ne!(first.cookie_hash, second.cookie_hash);
}

#[test]
fn hash_prints_verifiable_hash() {
    let output = semaphore()
        .args(["-hash", "mypassword"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Generated password: "))
        .get_output()
        .stdout
        .clone();

    let output = String::from_utf8(output).unwrap();
    let hash = output.trim().trim_start_matches("Generated password:").trim();
    assert!(!hash.is_empty());
    assert_ne!(hash, "mypassword");
    assert!(verify_password("mypassword", hash).unwrap());
}

#[test]
fn missing_configuration_exits_with_setup_guidance() {
    semaphore()
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("-setup"));
}

#[test]
fn malformed_configuration_file_is_fatal() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    semaphore()
        .arg("-config")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not decode configuration"));
}

#[test]
fn unreadable_configuration_file_is_fatal() {
    let directory = tempfile::tempdir().unwrap();

    semaphore()
        .arg("-config")
        .arg(directory.path().join("absent.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not open configuration file"));
}

#[test]
fn explicit_configuration_file_starts_normally() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("config.json");
    std::fs::write(&path, ConfigDocument::example().to_pretty_json().unwrap()).unwrap();

    semaphore()
        .env("PORT", "8080")
        .env("RUST_LOG", "info")
        .arg("-config")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains(":8080"));
}

#[test]
fn conflicting_modes_are_rejected() {
    semaphore()
        .args(["-setup", "-migrate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn setup_writes_configuration_from_scripted_answers() {
    let directory = tempfile::tempdir().unwrap();
    let output_directory = directory.path().join("generated");
    let answers = format!("{}{}\n", "\n".repeat(9), output_directory.display());

    semaphore()
        .arg("-setup")
        .current_dir(directory.path())
        .write_stdin(answers)
        .assert()
        .success()
        .stdout(predicate::str::contains(" > DB Name (default semaphore): "));

    let document = ConfigDocument::load_from_path(output_directory.join("config.json")).unwrap();
    assert_eq!(document.mysql.database_name, "semaphore");
    assert!(!document.cookie_hash.is_empty());
}
