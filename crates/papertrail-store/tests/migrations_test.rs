// Integration tests for the migration framework

use papertrail_store::migrations::{applied_migrations, apply_migrations};
use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let result = apply_migrations(&mut conn);

    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());
    assert_eq!(table_names(&conn), vec!["schema_version", "trails"]);
}

#[test]
fn test_reapplying_is_a_no_op() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    assert_eq!(applied_migrations(&conn).unwrap(), vec!["001_trails".to_string()]);
}

#[test]
fn test_tampered_checksum_is_rejected() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_trails'",
        [],
    )
    .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert_eq!(err.code(), "ERR_PERSISTENCE");
    assert!(err.message().contains("Checksum mismatch"));
}

#[test]
fn test_status_constraint_enforced() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO trails (id, content_type, version, change, content_json, status, created_at, updated_at)
         VALUES ('t1', 'api::a.a', 1, 'UPDATE', '{}', 'rejected', 0, 0)",
        [],
    );
    assert!(result.is_err());
}
