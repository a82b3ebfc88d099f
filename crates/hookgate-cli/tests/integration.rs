#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hookgate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hookgate").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("GITHUB_WEBHOOK_REPOS_JSON")
        .env_remove("GHE_ADDRESS")
        .env_remove("DEBUG");
    cmd
}

fn write_repos(dir: &TempDir, value: serde_json::Value) {
    std::fs::write(
        dir.path().join("repos.json"),
        serde_json::to_vec_pretty(&value).unwrap(),
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// hookgate config
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_complete_store() {
    let dir = TempDir::new().unwrap();
    let deploy = dir.path().join("widgets");
    std::fs::create_dir(&deploy).unwrap();
    write_repos(
        &dir,
        serde_json::json!({
            "acme/widgets": { "path": deploy, "key": "s3cret", "action": [["git", "pull"]] }
        }),
    );

    hookgate(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No warnings"));
}

#[test]
fn validate_fails_on_bad_record_key() {
    let dir = TempDir::new().unwrap();
    write_repos(
        &dir,
        serde_json::json!({ "widgets": { "path": "/srv/widgets", "action": [["true"]] } }),
    );

    hookgate(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] widgets"))
        .stderr(predicate::str::contains("validation found errors"));
}

#[test]
fn validate_reports_missing_store() {
    let dir = TempDir::new().unwrap();
    hookgate(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load repository store"));
}

#[test]
fn list_shows_records_without_secrets() {
    let dir = TempDir::new().unwrap();
    write_repos(
        &dir,
        serde_json::json!({
            "acme/widgets/branch:main": { "path": "/srv/widgets", "key": "s3cret", "action": [["git", "pull"]] },
            "acme/gadgets": {}
        }),
    );

    hookgate(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/widgets/branch:main"))
        .stdout(predicate::str::contains("/srv/widgets"))
        .stdout(predicate::str::contains("s3cret").not());

    let output = hookgate(&dir)
        .args(["config", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["acme/widgets/branch:main"]["signed"], true);
    assert_eq!(json["acme/widgets/branch:main"]["actions"][0], "git pull");
    assert_eq!(json["acme/gadgets"]["signed"], false);
}

#[test]
fn store_location_comes_from_environment() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("elsewhere.json");
    std::fs::write(&store, r#"{"acme/widgets": {"path": "/srv/widgets"}}"#).unwrap();

    hookgate(&dir)
        .env("GITHUB_WEBHOOK_REPOS_JSON", &store)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/widgets"));
}

// ---------------------------------------------------------------------------
// hookgate sign
// ---------------------------------------------------------------------------

#[test]
fn sign_file_prints_both_headers() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("payload.json"), "what do ya want for nothing?").unwrap();

    hookgate(&dir)
        .args(["sign", "--key", "Jefe", "payload.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "X-Hub-Signature: sha1=effcdf6ae5eb2fa2d27416d5f184df9c259a7c79",
        ))
        .stdout(predicate::str::contains(
            "X-Hub-Signature-256: sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843",
        ));
}

#[test]
fn sign_reads_stdin() {
    let dir = TempDir::new().unwrap();
    hookgate(&dir)
        .args(["sign", "--key", "Jefe", "--json"])
        .write_stdin("what do ya want for nothing?")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "sha1=effcdf6ae5eb2fa2d27416d5f184df9c259a7c79",
        ));
}

// ---------------------------------------------------------------------------
// hookgate serve
// ---------------------------------------------------------------------------

#[test]
fn serve_rejects_invalid_override() {
    let dir = TempDir::new().unwrap();
    hookgate(&dir)
        .args(["serve", "--bind", "127.0.0.1:0"])
        .env("GHE_ADDRESS", "not-an-address")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid GHE_ADDRESS"));
}
