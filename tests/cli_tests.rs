use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn statepack() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("statepack").unwrap();
    cmd.env_remove("STATEPACK_BASE_URL")
        .env_remove("STATEPACK_CACHE_DIR")
        .env_remove("STATEPACK_MEMORY_STORE")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_get_seed_pack_offline() {
    statepack()
        .args(["--memory", "get", "ga"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GA: seed (vseed-ga-2026-02-20)"))
        .stdout(predicate::str::contains("domains: 3, issues: 3, authorities: 4"));
}

#[test]
fn test_get_json_output() {
    let output = statepack()
        .args(["--memory", "--json", "get", "WY"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"]["source"], "seed");
    assert_eq!(json["status"]["state"], "WY");
    assert_eq!(json["pack"]["quality"], "baseline");
    assert_eq!(json["pack"]["packVersion"], "baseline-2026-02-20");
}

#[test]
fn test_get_accepts_full_state_name() {
    statepack()
        .args(["--memory", "get", "New York"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NY: seed (vbaseline-2026-02-20)"));
}

#[test]
fn test_unknown_state_fails() {
    statepack()
        .args(["--memory", "get", "ZZ"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("ZZ: none"));
}

#[test]
fn test_cache_persists_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().to_str().unwrap();

    statepack()
        .args(["--cache-dir", cache_dir, "cached", "GA"])
        .assert()
        .failure();

    statepack()
        .args(["--cache-dir", cache_dir, "get", "GA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seed"));

    statepack()
        .args(["--cache-dir", cache_dir, "cached", "GA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GA: cache (vseed-ga-2026-02-20)"))
        .stdout(predicate::str::contains("cache key: pack:GA:1:seed"));

    statepack()
        .args(["--cache-dir", cache_dir, "clear", "ga"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 cached pack(s) for GA"));

    statepack()
        .args(["--cache-dir", cache_dir, "cached", "GA"])
        .assert()
        .failure();
}

#[test]
fn test_manifest_offline() {
    statepack()
        .args(["--memory", "manifest", "--force"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("manifest: none"));
}

#[test]
fn test_states_listing() {
    let output = statepack().args(["--json", "states"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let states = json.as_array().unwrap();
    assert_eq!(states.len(), 51);
    let ga = states.iter().find(|s| s["code"] == "GA").unwrap();
    assert_eq!(ga["quality"], "curated");
    assert_eq!(ga["packVersion"], "seed-ga-2026-02-20");

    statepack()
        .arg("states")
        .assert()
        .success()
        .stdout(predicate::str::contains("DC"))
        .stdout(predicate::str::contains("District of Columbia"));
}
