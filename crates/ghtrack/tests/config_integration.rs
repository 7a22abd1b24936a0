//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary. Settings are
//! observed through their effect: which API server is contacted, which
//! credentials file is read, where logs land.

mod common;

use std::fs;

use common::{ApiServer, Reply, cmd, commits, repo_listing};
use predicates::prelude::*;
use tempfile::TempDir;

fn server() -> ApiServer {
    ApiServer::start(|target, _base| {
        if target.starts_with("/orgs/acme/repos") {
            Reply::json(repo_listing("acme", &["r1"]))
        } else if target.starts_with("/search/issues") {
            Reply::json(r#"{"total_count": 4, "items": []}"#)
        } else {
            Reply::json(commits(3))
        }
    })
}

fn toml_config(server: &ApiServer) -> String {
    format!("[github]\napi_url = \"{}\"\ntimeout_secs = 5\n", server.base_url())
}

const UNREACHABLE: &str = "[github]\napi_url = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n";

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .success();
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    let server = server();
    fs::write(tmp.path().join(".ghtrack.toml"), toml_config(&server)).unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "--json"])
        .args(["commits", "March", "acme", "--users=alice", "--repos=r1"])
        .args(["--access-token", "tok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"r1\": 3"));

    assert!(!server.targets().is_empty());
}

#[test]
fn discovers_regular_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let server = server();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(tmp.path().join("ghtrack.toml"), toml_config(&server)).unwrap();

    cmd()
        .args(["-C", sub_dir.to_str().unwrap(), "--json"])
        .args(["commits", "March", "acme", "--users=alice", "--repos=r1"])
        .args(["--access-token", "tok"])
        .assert()
        .success();

    assert!(!server.targets().is_empty());
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    let server = server();
    fs::write(tmp.path().join(".ghtrack.yaml"), server.config_yaml()).unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "--json"])
        .args(["reviews", "jan", "acme", "--users=alice", "--repos=r1"])
        .args(["--access-token", "tok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"r1\": 4"));

    assert!(server.targets().iter().any(|t| t.starts_with("/search/issues")));
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".ghtrack.json"), r#"{"log_level": "error"}"#).unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .success();
}

#[test]
fn credentials_file_sits_beside_yaml_config() {
    let tmp = TempDir::new().unwrap();
    let server = server();
    fs::write(tmp.path().join("ghtrack.yml"), server.config_yaml()).unwrap();
    fs::write(tmp.path().join(".ghtrack.yml"), "access_token: filetoken\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "--json"])
        .args(["commits", "March", "acme", "--users=alice", "--repos=r1"])
        .assert()
        .success();

    assert_eq!(
        server.seen()[0].authorization.as_deref(),
        Some("Bearer filetoken")
    );
}

#[test]
fn settings_in_credentials_file_are_not_config() {
    let tmp = TempDir::new().unwrap();
    let logs = tmp.path().join("logs");
    fs::write(
        tmp.path().join(".ghtrack.yml"),
        format!("access_token: tok\nlog_dir: \"{}\"\n", logs.display()),
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme"])
        .assert()
        .success();

    assert!(!logs.exists());
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn closer_config_takes_precedence() {
    let tmp = TempDir::new().unwrap();
    let server = server();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();

    fs::write(tmp.path().join(".ghtrack.toml"), UNREACHABLE).unwrap();
    fs::write(sub_dir.join(".ghtrack.toml"), toml_config(&server)).unwrap();

    cmd()
        .args(["-C", sub_dir.to_str().unwrap(), "--json"])
        .args(["commits", "March", "acme", "--users=alice", "--repos=r1"])
        .args(["--access-token", "tok"])
        .assert()
        .success();
}

#[test]
fn explicit_config_flag_wins_over_discovery() {
    let tmp = TempDir::new().unwrap();
    let server = server();
    fs::write(tmp.path().join(".ghtrack.toml"), UNREACHABLE).unwrap();
    let explicit = tmp.path().join("explicit.toml");
    fs::write(&explicit, toml_config(&server)).unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "--json"])
        .args(["-c", explicit.to_str().unwrap()])
        .args(["commits", "March", "acme", "--users=alice", "--repos=r1"])
        .args(["--access-token", "tok"])
        .assert()
        .success();
}

#[test]
fn credentials_file_key_is_honored() {
    let tmp = TempDir::new().unwrap();
    let secrets = tmp.path().join("secrets");
    fs::create_dir_all(&secrets).unwrap();
    fs::write(secrets.join("token.yml"), "access_token: fromconfig\n").unwrap();
    fs::write(
        tmp.path().join(".ghtrack.toml"),
        "credentials_file = \"secrets/token.yml\"\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme"])
        .assert()
        .success();
}

#[test]
fn credentials_flag_beats_config_key() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".ghtrack.toml"),
        "credentials_file = \"missing.yml\"\n",
    )
    .unwrap();
    let flag_file = tmp.path().join("flag.yml");
    fs::write(&flag_file, "access_token: fromflag\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme"])
        .args(["--credentials", flag_file.to_str().unwrap()])
        .assert()
        .success();
}

// =============================================================================
// Logging
// =============================================================================

#[test]
fn log_dir_from_config_receives_jsonl() {
    let tmp = TempDir::new().unwrap();
    let logs = tmp.path().join("logs");
    fs::write(
        tmp.path().join(".ghtrack.toml"),
        format!("log_level = \"debug\"\nlog_dir = \"{}\"\n", logs.display()),
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .success();

    let entries: Vec<_> = fs::read_dir(&logs).unwrap().collect();
    assert!(!entries.is_empty());
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".ghtrack.toml"), "this is not valid toml [[[").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn invalid_json_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".ghtrack.json"), "{not valid json}").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".ghtrack.toml"),
        "log_level = \"info\"\nunknown_field = \"ignored\"\nanother_unknown = 42\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .success();
}

// =============================================================================
// Boundary Marker Tests
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();

    // Outside the repository: must not be seen from src/.
    fs::write(parent.join(".ghtrack.toml"), "this is not valid toml [[[").unwrap();

    cmd()
        .args(["-C", src.to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .success();
}

#[test]
fn config_in_same_dir_as_git_is_found() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(repo.join(".ghtrack.toml"), "this is not valid toml [[[").unwrap();

    cmd()
        .args(["-C", src.to_str().unwrap()])
        .args(["stats", "March", "acme", "--access-token", "tok"])
        .assert()
        .failure();
}
