//! Habit repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/replace/query/delete APIs over `habits` storage.
//! - Keep week day and notification id child rows in step with their habit.
//!
//! # Invariants
//! - Write paths call `Habit::validate()` before SQL mutations.
//! - Every write runs inside one transaction; a failed write leaves no rows.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is `date_added DESC`, newest insertion first on ties.

use crate::db::migrations::ensure_latest;
use crate::db::DbError;
use crate::model::habit::{Habit, HabitColor, HabitId, HabitValidationError};
use chrono::NaiveTime;
use rusqlite::{params, Connection, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const HABIT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    color,
    is_reminder_on,
    reminder_text,
    notification_time,
    date_added
FROM habits";

const NOTIFICATION_TIME_FORMAT: &str = "%H:%M";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for habit persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(HabitValidationError),
    Db(DbError),
    NotFound(HabitId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "habit not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted habit data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<HabitValidationError> for RepoError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store contract for habits.
pub trait HabitRepository {
    /// Inserts a new habit and returns its id.
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    /// Replaces every field of an existing habit, including child rows.
    fn replace_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Lists all habits, newest `date_added` first.
    fn list_habits(&self) -> RepoResult<Vec<Habit>>;
    /// Deletes a habit. Returns `false` when no row matched.
    fn delete_habit(&self, id: HabitId) -> RepoResult<bool>;
}

impl<R: HabitRepository + ?Sized> HabitRepository for &R {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        (**self).create_habit(habit)
    }

    fn replace_habit(&self, habit: &Habit) -> RepoResult<()> {
        (**self).replace_habit(habit)
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        (**self).get_habit(id)
    }

    fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        (**self).list_habits()
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<bool> {
        (**self).delete_habit(id)
    }
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Wraps a connection without checking its schema version.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking that migrations are applied.
    ///
    /// # Errors
    /// - `Db(SchemaNotReady)` for connections not opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self::new(conn))
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (
                uuid,
                title,
                color,
                is_reminder_on,
                reminder_text,
                notification_time,
                date_added
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                habit.id.to_string(),
                habit.title.as_str(),
                habit.color.as_str(),
                bool_to_int(habit.is_reminder_on),
                habit.reminder_text.as_str(),
                format_notification_time(habit.notification_time),
                habit.date_added,
            ],
        )?;
        insert_child_rows(&tx, habit)?;
        tx.commit()?;

        Ok(habit.id)
    }

    fn replace_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE habits
             SET
                title = ?1,
                color = ?2,
                is_reminder_on = ?3,
                reminder_text = ?4,
                notification_time = ?5,
                date_added = ?6
             WHERE uuid = ?7;",
            params![
                habit.title.as_str(),
                habit.color.as_str(),
                bool_to_int(habit.is_reminder_on),
                habit.reminder_text.as_str(),
                format_notification_time(habit.notification_time),
                habit.date_added,
                habit.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(habit.id));
        }

        let id_text = habit.id.to_string();
        tx.execute(
            "DELETE FROM habit_week_days WHERE habit_uuid = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute(
            "DELETE FROM habit_notification_ids WHERE habit_uuid = ?1;",
            [id_text.as_str()],
        )?;
        insert_child_rows(&tx, habit)?;
        tx.commit()?;

        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let habit = self.load_children(parse_habit_row(row)?)?;
            return Ok(Some(habit));
        }

        Ok(None)
    }

    fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HABIT_SELECT_SQL} ORDER BY date_added DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut habits = Vec::new();

        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }

        habits
            .into_iter()
            .map(|habit| self.load_children(habit))
            .collect()
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM habits WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(changed > 0)
    }
}

impl SqliteHabitRepository<'_> {
    fn load_children(&self, mut habit: Habit) -> RepoResult<Habit> {
        let id_text = habit.id.to_string();

        let mut stmt = self.conn.prepare(
            "SELECT week_day FROM habit_week_days
             WHERE habit_uuid = ?1
             ORDER BY position ASC;",
        )?;
        habit.week_days = stmt
            .query_map([id_text.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT notification_id FROM habit_notification_ids
             WHERE habit_uuid = ?1
             ORDER BY position ASC;",
        )?;
        habit.notification_ids = stmt
            .query_map([id_text.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        habit.validate().map_err(|err| {
            RepoError::InvalidData(format!("habit {} failed validation: {err}", habit.id))
        })?;
        Ok(habit)
    }
}

fn insert_child_rows(tx: &Transaction<'_>, habit: &Habit) -> RepoResult<()> {
    let id_text = habit.id.to_string();

    let mut stmt = tx.prepare(
        "INSERT INTO habit_week_days (habit_uuid, position, week_day) VALUES (?1, ?2, ?3);",
    )?;
    for (position, day) in habit.week_days.iter().enumerate() {
        stmt.execute(params![id_text.as_str(), position as i64, day.as_str()])?;
    }

    let mut stmt = tx.prepare(
        "INSERT INTO habit_notification_ids (habit_uuid, position, notification_id)
         VALUES (?1, ?2, ?3);",
    )?;
    for (position, notification_id) in habit.notification_ids.iter().enumerate() {
        stmt.execute(params![
            id_text.as_str(),
            position as i64,
            notification_id.as_str()
        ])?;
    }

    Ok(())
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in habits.uuid"))
    })?;

    let color_text: String = row.get("color")?;
    let color = HabitColor::parse(&color_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid color `{color_text}` in habits.color"))
    })?;

    let is_reminder_on = match row.get::<_, i64>("is_reminder_on")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_reminder_on value `{other}` in habits.is_reminder_on"
            )));
        }
    };

    let time_text: String = row.get("notification_time")?;
    let notification_time = NaiveTime::parse_from_str(&time_text, NOTIFICATION_TIME_FORMAT)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid notification time `{time_text}` in habits.notification_time"
            ))
        })?;

    Ok(Habit {
        id,
        title: row.get("title")?,
        color,
        week_days: Vec::new(),
        is_reminder_on,
        reminder_text: row.get("reminder_text")?,
        notification_time,
        notification_ids: Vec::new(),
        date_added: row.get("date_added")?,
    })
}

fn format_notification_time(time: NaiveTime) -> String {
    time.format(NOTIFICATION_TIME_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
