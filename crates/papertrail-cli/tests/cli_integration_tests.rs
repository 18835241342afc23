//! CLI integration tests
//!
//! Run the built binary against temp files and a temp trail database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use papertrail_core::model::{ChangeKind, TrailSubmission};
use papertrail_core::papertrail_core_types::RequestContext;
use papertrail_store::{db, SqliteTrailRepo};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ARTICLE: &str = "api::article.article";

const SCHEMAS: &str = r#"{
    "contentTypes": [{
        "uid": "api::article.article",
        "kind": "collectionType",
        "info": {"singularName": "article", "pluralName": "articles"},
        "pluginOptions": {"paperTrail": {"enabled": true}},
        "attributes": {
            "title": {"type": "string"},
            "cover": {"type": "media", "multiple": false},
            "seo": {"type": "component", "component": "shared.seo", "repeatable": false}
        }
    }],
    "components": [{
        "uid": "shared.seo",
        "attributes": {"metaTitle": {"type": "string"}}
    }]
}"#;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_papertrail"))
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn seed_trail(db_path: &Path) -> String {
    let mut conn = db::open_migrated(db_path).unwrap();
    let record = SqliteTrailRepo::create(
        &mut conn,
        &TrailSubmission {
            context: RequestContext::new(),
            content_type: ARTICLE.to_string(),
            record_id: Some("12".to_string()),
            change: ChangeKind::Create,
            content: json!({"title": "Launch post"}),
            previous_content: None,
            changes: None,
            is_admin: true,
        },
    )
    .unwrap();
    record.id
}

#[test]
fn test_diff_prints_changes_and_paths() {
    let temp_dir = TempDir::new().unwrap();
    let schemas = temp_dir.path().join("schemas.json");
    fs::write(&schemas, SCHEMAS).unwrap();
    let new = write_json(
        temp_dir.path(),
        "new.json",
        &json!({"id": 1, "title": "New", "cover": {"id": 3, "url": "/b.png"}, "seo": {"metaTitle": "Meta"}}),
    );
    let previous = write_json(
        temp_dir.path(),
        "previous.json",
        &json!({"id": 1, "title": "Old", "cover": {"id": 3, "url": "/a.png"}, "seo": {"metaTitle": "Meta"}}),
    );

    let output = run(&[
        "diff",
        "--schemas",
        schemas.to_str().unwrap(),
        "--content-type",
        ARTICLE,
        "--new",
        new.to_str().unwrap(),
        "--previous",
        previous.to_str().unwrap(),
    ]);

    assert!(
        output.status.success(),
        "diff should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["changes"], json!({"title": "New"}));
    assert_eq!(printed["paths"], json!(["title"]));
}

#[test]
fn test_diff_unknown_content_type_fails() {
    let temp_dir = TempDir::new().unwrap();
    let schemas = temp_dir.path().join("schemas.json");
    fs::write(&schemas, SCHEMAS).unwrap();
    let new = write_json(temp_dir.path(), "new.json", &json!({"title": "x"}));

    let output = run(&[
        "diff",
        "--schemas",
        schemas.to_str().unwrap(),
        "--content-type",
        "api::missing.missing",
        "--new",
        new.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Schema not found"));
}

#[test]
fn test_trail_history_show_and_review() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("trails.db");
    let trail_id = seed_trail(&db_path);
    let db = db_path.to_str().unwrap();

    let history = run(&[
        "trail",
        "history",
        "--db",
        db,
        "--content-type",
        ARTICLE,
        "--record",
        "12",
        "--main-field",
        "title",
    ]);
    assert!(history.status.success());
    let stdout = String::from_utf8_lossy(&history.stdout);
    assert!(stdout.contains("Launch post (ID 12)"));
    assert!(stdout.contains("v1 CREATE pending"));

    let show = run(&["trail", "show", "--db", db, &trail_id]);
    assert!(show.status.success());
    let shown: Value = serde_json::from_slice(&show.stdout).unwrap();
    assert_eq!(shown["id"], json!(trail_id));
    assert_eq!(shown["status"], json!("pending"));

    let review = run(&[
        "trail", "review", "--db", db, &trail_id, "--status", "approved", "--comment", "ship it",
    ]);
    assert!(
        review.status.success(),
        "review should succeed. Stderr: {}",
        String::from_utf8_lossy(&review.stderr)
    );
    assert!(String::from_utf8_lossy(&review.stdout).contains("status: approved"));

    let again = run(&["trail", "review", "--db", db, &trail_id, "--status", "pending"]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("ERR_INVALID_TRANSITION"));
}

#[test]
fn test_show_missing_trail_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("trails.db");

    let output = run(&["trail", "show", "--db", db_path.to_str().unwrap(), "nope"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Trail not found"));
}

#[test]
fn test_diff_reads_schemas_and_options_from_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("schemas.json"), SCHEMAS).unwrap();
    let config = temp_dir.path().join("papertrail.toml");
    fs::write(
        &config,
        "schemas_path = \"schemas.json\"\n\n[diff]\nexcluded_keys = [\"title\"]\n",
    )
    .unwrap();
    let new = write_json(
        temp_dir.path(),
        "new.json",
        &json!({"title": "New", "seo": {"metaTitle": "Meta"}}),
    );

    let output = run(&[
        "diff",
        "--config",
        config.to_str().unwrap(),
        "--content-type",
        ARTICLE,
        "--new",
        new.to_str().unwrap(),
    ]);

    assert!(
        output.status.success(),
        "diff should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["changes"], json!({"seo": {"metaTitle": "Meta"}}));
    assert_eq!(printed["paths"], json!(["seo.metaTitle"]));
}
