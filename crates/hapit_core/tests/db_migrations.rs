use hapit_core::db::migrations::{current_user_version, latest_version};
use hapit_core::db::{open_db, open_db_in_memory, DbError};
use hapit_core::{HabitRepository, RepoError, SqliteHabitRepository};
use rusqlite::{params, Connection};

const HABIT_ID: &str = "6f1c2a4e-8d1b-4c39-9a57-0b4f7d0e2c11";

fn insert_habit_row(conn: &Connection, uuid: &str, title: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO habits (uuid, title, notification_time, date_added)
         VALUES (?1, ?2, '08:00', 1);",
        params![uuid, title],
    )
}

fn insert_outbox_row(
    conn: &Connection,
    identifier: &str,
    weekday: i64,
    hour: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO notification_outbox
            (identifier, title, subtitle, sound, weekday, hour, minute, repeats, queued_at)
         VALUES (?1, 'Habit Reminder', 'drink water', 'default', ?2, ?3, 0, 1, 0);",
        params![identifier, weekday, hour],
    )
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

#[test]
fn fresh_database_has_habit_and_outbox_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    let tables = table_names(&conn);
    for expected in [
        "habit_notification_ids",
        "habit_week_days",
        "habits",
        "notification_outbox",
    ] {
        assert!(tables.iter().any(|name| name == expected), "{expected}");
    }
}

#[test]
fn reopening_file_keeps_version_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hapit.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        insert_habit_row(&conn, HABIT_ID, "Floss").unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_eq!(row_count(&conn, "habits"), 1);
}

#[test]
fn version_one_file_is_upgraded_with_habits_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.sqlite3");

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(include_str!("../src/db/migrations/0001_habits.sql"))
            .unwrap();
        conn.execute_batch("PRAGMA user_version = 1;").unwrap();
        insert_habit_row(&conn, HABIT_ID, "Floss").unwrap();
        conn.execute(
            "INSERT INTO habit_week_days (habit_uuid, position, week_day)
             VALUES (?1, 0, 'Tuesday');",
            [HABIT_ID],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), 2);
    assert_eq!(row_count(&conn, "notification_outbox"), 0);

    let repo = SqliteHabitRepository::try_new(&conn).unwrap();
    let habits = repo.list_habits().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].week_days, vec!["Tuesday"]);
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 42;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => assert_eq!((db_version, latest_supported), (42, latest_version())),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteHabitRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::Db(DbError::SchemaNotReady { db_version: 0, .. })
    ));
}

#[test]
fn deleting_habit_cascades_to_child_rows() {
    let conn = open_db_in_memory().unwrap();
    insert_habit_row(&conn, HABIT_ID, "Floss").unwrap();
    conn.execute_batch(&format!(
        "INSERT INTO habit_week_days (habit_uuid, position, week_day)
            VALUES ('{HABIT_ID}', 0, 'Monday'), ('{HABIT_ID}', 1, 'Friday');
         INSERT INTO habit_notification_ids (habit_uuid, position, notification_id)
            VALUES ('{HABIT_ID}', 0, 'job-a');"
    ))
    .unwrap();

    conn.execute("DELETE FROM habits WHERE uuid = ?1;", [HABIT_ID])
        .unwrap();
    assert_eq!(row_count(&conn, "habit_week_days"), 0);
    assert_eq!(row_count(&conn, "habit_notification_ids"), 0);
}

#[test]
fn child_rows_require_an_existing_habit() {
    let conn = open_db_in_memory().unwrap();

    let orphan = conn.execute(
        "INSERT INTO habit_week_days (habit_uuid, position, week_day)
         VALUES ('missing', 0, 'Monday');",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn habit_constraints_reject_empty_title_and_repeated_day() {
    let conn = open_db_in_memory().unwrap();
    assert!(insert_habit_row(&conn, HABIT_ID, "").is_err());

    insert_habit_row(&conn, HABIT_ID, "Floss").unwrap();
    let insert_day = |position: i64| {
        conn.execute(
            "INSERT INTO habit_week_days (habit_uuid, position, week_day)
             VALUES (?1, ?2, 'Sunday');",
            params![HABIT_ID, position],
        )
    };
    insert_day(0).unwrap();
    assert!(insert_day(1).is_err());
}

#[test]
fn outbox_checks_trigger_ranges() {
    let conn = open_db_in_memory().unwrap();

    insert_outbox_row(&conn, "sunday", 1, 0).unwrap();
    insert_outbox_row(&conn, "saturday", 7, 23).unwrap();
    assert!(insert_outbox_row(&conn, "weekday-zero", 0, 9).is_err());
    assert!(insert_outbox_row(&conn, "weekday-eight", 8, 9).is_err());
    assert!(insert_outbox_row(&conn, "hour-24", 3, 24).is_err());
    assert!(insert_outbox_row(&conn, "sunday", 2, 9).is_err());
    assert_eq!(row_count(&conn, "notification_outbox"), 2);
}
