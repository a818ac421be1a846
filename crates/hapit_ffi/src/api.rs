//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose habit list/save/delete and the reminder outbox to Dart via FRB.
//! - Carry the platform notification permission from each request into
//!   the editor.
//! - Keep error semantics simple: envelopes with `ok` + message.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens its own connection; no habit or permission state is
//!   cached here.

use chrono::{Datelike, Local, NaiveTime, Timelike};
use hapit_core::db::open_db;
use hapit_core::{
    core_version as core_version_inner, habit_cards, init_logging as init_logging_inner,
    ping as ping_inner, DraftEdit, HabitColor, HabitEditor, HabitRepository,
    NotificationPermission, NotificationRequest, SqliteHabitRepository, SqliteNotificationOutbox,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "hapit.sqlite3";
const DB_PATH_ENV: &str = "HAPIT_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One weekday column of a habit card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDayItem {
    pub week_day: String,
    /// Day of month of this column in the current week.
    pub day_of_month: u32,
    pub is_active: bool,
}

/// Habit row for the card list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitItem {
    pub habit_id: String,
    pub title: String,
    /// Palette id `card-1`..`card-7`.
    pub color: String,
    pub week_days: Vec<String>,
    pub is_reminder_on: bool,
    pub reminder_text: String,
    pub reminder_hour: u32,
    pub reminder_minute: u32,
    pub frequency_label: String,
    pub days: Vec<HabitDayItem>,
}

/// Habit list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitListResponse {
    pub ok: bool,
    /// Newest first.
    pub items: Vec<HabitItem>,
    pub message: String,
}

/// Input for the habit form "Done" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitSaveRequest {
    /// `None` creates a habit; `Some(id)` replaces that habit.
    pub habit_id: Option<String>,
    pub title: String,
    pub color: String,
    pub week_days: Vec<String>,
    pub is_reminder_on: bool,
    pub reminder_text: String,
    pub reminder_hour: u32,
    pub reminder_minute: u32,
    /// Platform answer to the notification authorization prompt, as last
    /// reported to the host. Reminder saves fail unless this is `true`.
    pub notifications_granted: bool,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitActionResponse {
    pub ok: bool,
    pub habit_id: Option<String>,
    pub message: String,
}

impl HabitActionResponse {
    fn success(message: impl Into<String>, habit_id: String) -> Self {
        Self {
            ok: true,
            habit_id: Some(habit_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            habit_id: None,
            message: message.into(),
        }
    }
}

/// Queued reminder for the host to post through the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub identifier: String,
    pub title: String,
    pub subtitle: String,
    pub sound: String,
    /// 1-based weekday, Sunday = 1.
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub repeats: bool,
}

/// Lists stored habits with their weekly card projection.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_list() -> HabitListResponse {
    let result = with_connection(|conn| {
        let repo = SqliteHabitRepository::try_new(conn).map_err(|err| err.to_string())?;
        let outbox = SqliteNotificationOutbox::new(conn, false);
        HabitEditor::new(&repo, &outbox)
            .habits()
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(habits) => {
            let today = Local::now().date_naive();
            let items = habits
                .iter()
                .zip(habit_cards(&habits, today))
                .map(|(habit, card)| HabitItem {
                    habit_id: habit.id.to_string(),
                    title: habit.title.clone(),
                    color: habit.color.as_str().to_string(),
                    week_days: habit.week_days.clone(),
                    is_reminder_on: habit.is_reminder_on,
                    reminder_text: habit.reminder_text.clone(),
                    reminder_hour: habit.notification_time.hour(),
                    reminder_minute: habit.notification_time.minute(),
                    frequency_label: card.frequency_label,
                    days: card
                        .days
                        .into_iter()
                        .map(|day| HabitDayItem {
                            week_day: day.week_day.to_string(),
                            day_of_month: day.date.day(),
                            is_active: day.is_active,
                        })
                        .collect(),
                })
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No habits.".to_string()
            } else {
                format!("Found {} habit(s).", items.len())
            };
            HabitListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => HabitListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("habit_list failed: {err}"),
        },
    }
}

/// Commits the habit form: schedules reminders into the outbox when enabled,
/// then inserts or replaces the habit.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - On failure nothing is persisted; the UI keeps the form open.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_save(request: HabitSaveRequest) -> HabitActionResponse {
    match with_connection(|conn| save_with(conn, request)) {
        Ok(habit_id) => HabitActionResponse::success("Habit saved.", habit_id),
        Err(err) => HabitActionResponse::failure(format!("habit_save failed: {err}")),
    }
}

/// Deletes one habit by id. Queued reminders of the habit are not recalled.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_delete(habit_id: String) -> HabitActionResponse {
    let result = with_connection(|conn| {
        let id = parse_habit_id(&habit_id)?;
        let repo = SqliteHabitRepository::try_new(conn).map_err(|err| err.to_string())?;
        let habit = repo
            .get_habit(id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("habit not found: {id}"))?;

        // Removal never schedules, so the outbox is handed in unauthorized.
        let outbox = SqliteNotificationOutbox::new(conn, false);
        let mut editor = HabitEditor::new(&repo, &outbox);
        editor.load_for_edit(habit);
        editor.remove().map_err(|err| err.to_string())?;
        Ok(id.to_string())
    });

    match result {
        Ok(id) => HabitActionResponse::success("Habit deleted.", id),
        Err(err) => HabitActionResponse::failure(format!("habit_delete failed: {err}")),
    }
}

/// Returns and clears queued reminder requests.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; returns an empty list on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_outbox_drain() -> Vec<NotificationItem> {
    let result = with_connection(|conn| {
        SqliteNotificationOutbox::new(conn, false)
            .drain()
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(requests) => requests.into_iter().map(to_notification_item).collect(),
        Err(err) => {
            warn!("event=outbox_drain module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

fn save_with(conn: &Connection, request: HabitSaveRequest) -> Result<String, String> {
    let color = HabitColor::parse(&request.color)
        .ok_or_else(|| format!("unknown color `{}`", request.color))?;
    let reminder_time =
        NaiveTime::from_hms_opt(request.reminder_hour, request.reminder_minute, 0).ok_or_else(
            || {
                format!(
                    "invalid reminder time {}:{}",
                    request.reminder_hour, request.reminder_minute
                )
            },
        )?;

    let repo = SqliteHabitRepository::try_new(conn).map_err(|err| err.to_string())?;
    let permission = if request.notifications_granted {
        NotificationPermission::Granted
    } else {
        NotificationPermission::Denied
    };
    let outbox = SqliteNotificationOutbox::new(conn, request.notifications_granted);
    let mut editor = HabitEditor::new(&repo, &outbox).with_permission(permission);

    if let Some(raw_id) = request.habit_id.as_deref() {
        let id = parse_habit_id(raw_id)?;
        let existing = repo
            .get_habit(id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("habit not found: {id}"))?;
        editor.load_for_edit(existing);
    }

    editor.apply_edit(DraftEdit::Title(request.title.trim().to_string()));
    editor.apply_edit(DraftEdit::Color(color));
    editor.apply_edit(DraftEdit::WeekDays(request.week_days));
    editor.apply_edit(DraftEdit::ReminderOn(request.is_reminder_on));
    editor.apply_edit(DraftEdit::ReminderText(
        request.reminder_text.trim().to_string(),
    ));
    editor.apply_edit(DraftEdit::ReminderTime(reminder_time));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|err| format!("runtime init failed: {err}"))?;
    let saved = runtime
        .block_on(editor.commit())
        .map_err(|err| err.to_string())?;
    Ok(saved.id.to_string())
}

fn parse_habit_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid habit id `{raw}`"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_connection<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}

fn to_notification_item(request: NotificationRequest) -> NotificationItem {
    NotificationItem {
        identifier: request.identifier,
        title: request.content.title,
        subtitle: request.content.subtitle,
        sound: request.content.sound,
        weekday: request.trigger.weekday,
        hour: request.trigger.hour,
        minute: request.trigger.minute,
        repeats: request.trigger.repeats,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, habit_delete, habit_list, habit_save, init_logging,
        notification_outbox_drain, ping, HabitSaveRequest,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn save_request(title: String, week_days: &[&str]) -> HabitSaveRequest {
        HabitSaveRequest {
            habit_id: None,
            title,
            color: "card-2".to_string(),
            week_days: week_days.iter().map(|day| day.to_string()).collect(),
            is_reminder_on: false,
            reminder_text: String::new(),
            reminder_hour: 7,
            reminder_minute: 30,
            notifications_granted: false,
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn habit_save_then_list_returns_card() {
        let title = unique_token("ffi-save");
        let response = habit_save(save_request(title.clone(), &["Monday", "Friday"]));
        assert!(response.ok, "{}", response.message);
        let habit_id = response.habit_id.expect("save should return habit_id");

        let listed = habit_list();
        assert!(listed.ok, "{}", listed.message);
        let item = listed
            .items
            .iter()
            .find(|item| item.habit_id == habit_id)
            .expect("saved habit should be listed");
        assert_eq!(item.title, title);
        assert_eq!(item.color, "card-2");
        assert_eq!(item.frequency_label, "2 times a week");
        assert_eq!(item.days.len(), 7);
        assert_eq!((item.reminder_hour, item.reminder_minute), (7, 30));
    }

    #[test]
    fn habit_save_with_id_replaces_existing() {
        let created = habit_save(save_request(unique_token("ffi-edit"), &["Sunday"]));
        assert!(created.ok, "{}", created.message);
        let habit_id = created.habit_id.expect("save should return habit_id");

        let renamed = unique_token("ffi-edit-renamed");
        let mut request = save_request(renamed.clone(), &["Sunday", "Saturday"]);
        request.habit_id = Some(habit_id.clone());
        let updated = habit_save(request);
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.habit_id.as_deref(), Some(habit_id.as_str()));

        let matches: Vec<_> = habit_list()
            .items
            .into_iter()
            .filter(|item| item.habit_id == habit_id)
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, renamed);
        assert_eq!(matches[0].week_days, vec!["Sunday", "Saturday"]);
    }

    #[test]
    fn habit_save_rejects_incomplete_form_and_bad_inputs() {
        let empty_days = habit_save(save_request(unique_token("ffi-empty"), &[]));
        assert!(!empty_days.ok);
        assert!(empty_days.message.contains("incomplete"));

        let mut bad_color = save_request(unique_token("ffi-color"), &["Monday"]);
        bad_color.color = "card-0".to_string();
        let response = habit_save(bad_color);
        assert!(!response.ok);
        assert!(response.message.contains("unknown color"));

        let mut bad_time = save_request(unique_token("ffi-time"), &["Monday"]);
        bad_time.reminder_hour = 25;
        assert!(!habit_save(bad_time).ok);
    }

    #[test]
    fn reminder_save_queues_outbox_and_delete_keeps_it() {
        let mut request = save_request(unique_token("ffi-reminder"), &["Monday", "Wednesday"]);
        request.notifications_granted = true;
        request.is_reminder_on = true;
        request.reminder_text = "stretch".to_string();
        let response = habit_save(request);
        assert!(response.ok, "{}", response.message);
        let habit_id = response.habit_id.expect("save should return habit_id");

        let deleted = habit_delete(habit_id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert!(!habit_list()
            .items
            .iter()
            .any(|item| item.habit_id == habit_id));

        let queued: Vec<_> = notification_outbox_drain()
            .into_iter()
            .filter(|item| item.subtitle == "stretch")
            .collect();
        assert!(queued.len() >= 2);
        assert!(queued
            .iter()
            .all(|item| item.title == "Habit Reminder" && item.hour == 7 && item.minute == 30));
    }

    #[test]
    fn reminder_save_without_permission_persists_nothing() {
        let title = unique_token("ffi-no-permission");
        let mut request = save_request(title.clone(), &["Tuesday"]);
        request.is_reminder_on = true;
        request.reminder_text = unique_token("ffi-no-permission-text");
        let reminder_text = request.reminder_text.clone();

        let response = habit_save(request);
        assert!(!response.ok);
        assert!(response.message.contains("permission denied"));
        assert!(!habit_list().items.iter().any(|item| item.title == title));
        assert!(!notification_outbox_drain()
            .iter()
            .any(|item| item.subtitle == reminder_text));
    }

    #[test]
    fn blank_title_and_blank_reminder_text_are_both_incomplete() {
        let blank_title = habit_save(save_request("   ".to_string(), &["Monday"]));
        assert!(!blank_title.ok);
        assert!(blank_title.message.contains("incomplete"));

        let mut blank_reminder = save_request(unique_token("ffi-blank-reminder"), &["Monday"]);
        blank_reminder.notifications_granted = true;
        blank_reminder.is_reminder_on = true;
        blank_reminder.reminder_text = " \t ".to_string();
        let response = habit_save(blank_reminder);
        assert!(!response.ok);
        assert!(response.message.contains("incomplete"));
    }

    #[test]
    fn habit_delete_rejects_unknown_and_malformed_ids() {
        let malformed = habit_delete("not-a-uuid".to_string());
        assert!(!malformed.ok);
        assert!(malformed.message.contains("invalid habit id"));

        let missing = habit_delete(uuid::Uuid::new_v4().to_string());
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
