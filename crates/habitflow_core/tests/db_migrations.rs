use habitflow_core::db::migrations::latest_version;
use habitflow_core::db::{open_db, open_db_in_memory, DbError};
use habitflow_core::{RepoError, SqliteCompletionRepository, SqliteHabitRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "habits");
    assert_table_exists(&conn, "habit_target_days");
    assert_table_exists(&conn, "habit_completions");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitflow.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "habit_completions");
}

#[test]
fn concurrent_first_opens_migrate_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.db");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            std::thread::spawn(move || open_db(&path).map(|conn| schema_version(&conn)))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), latest_version());
    }
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn completions_table_enforces_unique_habit_date_key() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO habits (uuid, owner_id, title, frequency)
         VALUES ('11111111-2222-4333-8444-555555555555', 'u', 'Walk', 'daily');
         INSERT INTO habit_completions (uuid, habit_uuid, completion_date)
         VALUES ('aaaaaaaa-2222-4333-8444-555555555555',
                 '11111111-2222-4333-8444-555555555555', 738886);",
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO habit_completions (uuid, habit_uuid, completion_date)
         VALUES ('bbbbbbbb-2222-4333-8444-555555555555',
                 '11111111-2222-4333-8444-555555555555', 738886);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteHabitRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
    assert!(SqliteCompletionRepository::try_new(&conn).is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
