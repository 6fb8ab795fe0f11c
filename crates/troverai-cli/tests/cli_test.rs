#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags_and_examples() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--prima-serata"))
        .stdout(predicate::str::contains("--token-file"))
        .stdout(predicate::str::contains("Date formats:"));
}

#[test]
fn test_version() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("troverai"));
}

#[test]
fn test_invalid_date() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--canale", "rai-1", "--data", "dopodomani", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid date: dopodomani"))
        .stderr(predicate::str::contains("For more information, try '--help'."));
}

#[test]
fn test_impossible_date() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--prima-serata", "--data", "31-02-2026", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date: 31-02-2026"));
}

#[test]
fn test_invalid_time() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--canale", "rai-1", "--dalle", "25:00", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid time: 25:00"));
}

#[test]
fn test_modes_are_mutually_exclusive() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--ora", "--canali"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_ora_conflicts_with_time_window() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--ora", "--dalle", "20:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_json_conflicts_with_compact() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--json", "--compatto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_invalid_config_file() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[channels\n").unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--canali", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn test_invalid_base_url_in_config() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[api]\nbase_url = \"not a url\"\n",
    )
    .unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--canali", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid api.base_url"));
}

#[test]
fn test_corrupt_token_file() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("tokens.json");
    std::fs::write(&token_file, "{not json").unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--canali", "--dir"])
        .arg(dir.path())
        .arg("--token-file")
        .arg(&token_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn test_window_without_schedule_is_rejected() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--dalle", "20:00", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--dalle/--alle apply to a schedule"));
}

#[test]
fn test_window_with_other_date_is_accepted_by_default_view() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[api]\nbase_url = \"not a url\"\n",
    )
    .unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--alle", "12:00", "--data", "domani", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid api.base_url"))
        .stderr(predicate::str::contains("--dalle/--alle").not());
}

#[test]
fn test_status_without_token_file() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--stato", "--dir"])
        .arg(dir.path())
        .arg("--token-file")
        .arg(dir.path().join("tokens.json"))
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nessun token salvato"))
        .stdout(predicate::str::contains("tokens.json"));
}

#[test]
fn test_login_requires_credentials() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--accedi", "--dir"])
        .arg(dir.path())
        .env_remove("RAIPLAY_USERNAME")
        .env_remove("RAIPLAY_PASSWORD")
        .assert()
        .failure()
        .stderr(predicate::str::contains("RAIPLAY_USERNAME and RAIPLAY_PASSWORD"));
    assert!(!dir.path().join("raiplay_tokens.json").exists());
}

#[test]
fn test_login_and_status_are_modes() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("troverai");
    cmd.args(["--accedi", "--stato"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
