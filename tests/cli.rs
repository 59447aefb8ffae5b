use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn cmd(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("steamsnap");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run"))
        .stdout(contains("completions"));
}

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(contains("steamsnap"));
}

#[test]
fn count_is_bounded() {
    let home = TempDir::new().unwrap();
    cmd(&home).args(["run", "Hades", "--count", "0"]).assert().failure().stderr(contains("--count"));
    cmd(&home).args(["run", "Hades", "--count", "21"]).assert().failure().stderr(contains("--count"));
}

#[test]
fn unknown_format_is_rejected() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["run", "Hades", "--format", "xml"])
        .assert()
        .failure()
        .stderr(contains("--format"));
}

#[test]
fn missing_api_key_fails_before_fetching() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["run", "Hades"])
        .assert()
        .failure()
        .stderr(contains("missing required API key"));
}

#[test]
fn broken_config_is_reported() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("steamsnap.toml"), "[agent\nmodel = 1").unwrap();
    cmd(&home)
        .args(["run", "Hades"])
        .assert()
        .failure()
        .stderr(contains("failed to parse config"));
}
