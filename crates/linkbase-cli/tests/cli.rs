//! End-to-end tests for the linkbase binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Binary with an isolated database and config file
fn linkbase(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("linkbase").unwrap();
    cmd.env("LINKBASE_CONFIG", dir.path().join("config.toml"))
        .env_remove("LINKBASE_DATA_DIR")
        .env_remove("LINKBASE_DB")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(dir.path().join("graph.db"));
    cmd
}

fn json_of(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn seed_triangle(dir: &TempDir) {
    for (src, dst) in [("a", "b"), ("b", "c"), ("a", "c")] {
        linkbase(dir).args(["edge", "add", src, dst]).assert().success();
    }
}

fn node_names(view: &Value) -> Vec<String> {
    let mut names: Vec<String> = view["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_node_add_normalizes_and_updates_label() {
    let dir = TempDir::new().unwrap();

    linkbase(&dir)
        .args(["node", "add", "  New York City ", "--label", "City"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new york city\tCity"));

    linkbase(&dir)
        .args(["node", "add", "new york city", "--label", "Location"])
        .assert()
        .success();

    let node = json_of(linkbase(&dir).args(["--format", "json", "node", "get", "NEW YORK CITY"]));
    assert_eq!(node["name"], "new york city");
    assert_eq!(node["label"], "Location");
    assert_eq!(node["id"], 1);
}

#[test]
fn test_node_get_missing_fails() {
    let dir = TempDir::new().unwrap();
    linkbase(&dir)
        .args(["node", "get", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Node 'nobody' not found"));
}

#[test]
fn test_blank_name_rejected() {
    let dir = TempDir::new().unwrap();
    linkbase(&dir)
        .args(["node", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entity name cannot be empty"));
}

#[test]
fn test_edge_add_is_idempotent() {
    let dir = TempDir::new().unwrap();

    let first = linkbase(&dir)
        .args(["edge", "add", "SAN FRANCISCO", "California", "--label", "IS_IN_STATE"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let second = linkbase(&dir)
        .args(["edge", "add", "san francisco", " california", "-l", "is_in_state"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(first, second);

    let stats = json_of(linkbase(&dir).args(["-f", "json", "stats"]));
    assert_eq!(stats["nodes"], 2);
    assert_eq!(stats["edges"], 1);
}

#[test]
fn test_paths_and_neighborhood() {
    let dir = TempDir::new().unwrap();
    seed_triangle(&dir);

    let view = json_of(linkbase(&dir).args(["paths", "a", "c", "--max-depth", "2"]));
    assert_eq!(view["edges"].as_array().unwrap().len(), 3);
    assert_eq!(node_names(&view), vec!["a", "b", "c"]);
    assert!(view.get("start_node_id").is_some());
    assert!(view.get("end_node_id").is_some());
    assert!(view.get("error_message").is_none());

    let view = json_of(linkbase(&dir).args(["neighborhood", "B", "--depth", "1"]));
    assert_eq!(node_names(&view), vec!["a", "b", "c"]);
    assert_eq!(view["edges"].as_array().unwrap().len(), 2);
    assert_eq!(view["center_node_id"], view["nodes"][0]["id"]);
}

#[test]
fn test_no_path_reports_message() {
    let dir = TempDir::new().unwrap();
    seed_triangle(&dir);

    let view = json_of(linkbase(&dir).args(["paths", "c", "a"]));
    assert!(view["edges"].as_array().unwrap().is_empty());
    assert_eq!(node_names(&view), vec!["a", "c"]);
    assert!(view["error_message"]
        .as_str()
        .unwrap()
        .starts_with("No paths between 'c' and 'a'"));
}

#[test]
fn test_not_found_is_a_normal_exit() {
    let dir = TempDir::new().unwrap();
    seed_triangle(&dir);

    let view = json_of(linkbase(&dir).args(["neighborhood", "ghost"]));
    assert_eq!(view["error_message"], "Center node 'ghost' not found");
    assert!(view["nodes"].as_array().unwrap().is_empty());

    let view = json_of(linkbase(&dir).args(["paths", "a", "ghost"]));
    assert_eq!(view["error_message"], "End node 'ghost' not found");
    assert!(view.get("start_node_id").is_some());
}

#[test]
fn test_export_then_import_into_fresh_db() {
    let src = TempDir::new().unwrap();
    seed_triangle(&src);
    linkbase(&src)
        .args(["node", "add", "a", "--label", "Letter"])
        .assert()
        .success();

    let export_path = src.path().join("graph.json");
    linkbase(&src)
        .args(["export", "-o"])
        .arg(&export_path)
        .assert()
        .success();

    let dst = TempDir::new().unwrap();
    linkbase(&dst)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 nodes and 3 edges"));

    let view = json_of(linkbase(&dst).arg("graph"));
    assert_eq!(node_names(&view), vec!["a", "b", "c"]);
    assert_eq!(view["edges"].as_array().unwrap().len(), 3);
    let a = view["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["name"] == "a")
        .unwrap();
    assert_eq!(a["label"], "Letter");
}

#[test]
fn test_schema_lists_tables() {
    let dir = TempDir::new().unwrap();
    linkbase(&dir)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE nodes"))
        .stdout(predicate::str::contains("idx_edges_unique"));
}

#[test]
fn test_config_set_drives_default_depth() {
    let dir = TempDir::new().unwrap();
    seed_triangle(&dir);
    linkbase(&dir).args(["edge", "add", "c", "d"]).assert().success();

    linkbase(&dir)
        .args(["config", "set", "default_depth", "2"])
        .assert()
        .success();
    linkbase(&dir)
        .args(["config", "get", "default_depth"])
        .assert()
        .success()
        .stdout("2\n");

    let view = json_of(linkbase(&dir).args(["neighborhood", "b"]));
    assert_eq!(node_names(&view), vec!["a", "b", "c", "d"]);

    linkbase(&dir)
        .args(["config", "get", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_log_file_receives_records() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("logs").join("linkbase.log");

    linkbase(&dir)
        .arg("-v")
        .arg("--log-file")
        .arg(&log)
        .args(["edge", "add", "x", "y"])
        .assert()
        .success();

    let content = std::fs::read_to_string(&log).unwrap();
    assert!(content.contains("Created node 'x'"));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    linkbase(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linkbase"));
}
