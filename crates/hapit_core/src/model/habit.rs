//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical persisted habit record.
//! - Define the fixed color palette shared by habit cards.
//! - Validate record completeness before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `title` and `week_days` are non-empty for every persisted habit.
//! - `reminder_text` is non-empty whenever `is_reminder_on` is set.
//! - `week_days` never contains the same name twice.
//! - `notification_time` has zero seconds.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every persisted habit.
pub type HabitId = Uuid;

/// Color tag selecting one card color from the fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HabitColor {
    #[default]
    #[serde(rename = "card-1")]
    Card1,
    #[serde(rename = "card-2")]
    Card2,
    #[serde(rename = "card-3")]
    Card3,
    #[serde(rename = "card-4")]
    Card4,
    #[serde(rename = "card-5")]
    Card5,
    #[serde(rename = "card-6")]
    Card6,
    #[serde(rename = "card-7")]
    Card7,
}

impl HabitColor {
    /// Full palette in display order.
    pub const ALL: [HabitColor; 7] = [
        Self::Card1,
        Self::Card2,
        Self::Card3,
        Self::Card4,
        Self::Card5,
        Self::Card6,
        Self::Card7,
    ];

    /// Stable string id stored in the database and handed to the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card1 => "card-1",
            Self::Card2 => "card-2",
            Self::Card3 => "card-3",
            Self::Card4 => "card-4",
            Self::Card5 => "card-5",
            Self::Card6 => "card-6",
            Self::Card7 => "card-7",
        }
    }

    /// Parses a stable string id. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == value.trim())
    }
}

impl Display for HabitColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for habit records and drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitValidationError {
    EmptyTitle,
    NoWeekDays,
    DuplicateWeekDay,
    MissingReminderText,
    /// Reminder times are stored with minute precision.
    TimeHasSeconds,
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "habit title must not be empty"),
            Self::NoWeekDays => write!(f, "habit must be active on at least one week day"),
            Self::DuplicateWeekDay => write!(f, "week_days must not repeat a day"),
            Self::MissingReminderText => {
                write!(f, "reminder_text must not be empty when the reminder is on")
            }
            Self::TimeHasSeconds => write!(f, "notification_time must have zero seconds"),
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical persisted habit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    pub color: HabitColor,
    /// Weekday names from [`crate::calendar::WEEKDAY_SYMBOLS`], in the order
    /// the user picked them.
    pub week_days: Vec<String>,
    pub is_reminder_on: bool,
    pub reminder_text: String,
    /// Trigger time for every reminder of this habit. Seconds are always zero.
    pub notification_time: NaiveTime,
    /// Identifiers of scheduled notification jobs, one per scheduled weekday.
    pub notification_ids: Vec<String>,
    /// Unix epoch milliseconds.
    pub date_added: i64,
}

impl Habit {
    /// Creates a habit with a generated id and `date_added = now`.
    ///
    /// Reminder fields start disabled and the trigger time starts at the
    /// current local minute.
    pub fn new(title: impl Into<String>, color: HabitColor, week_days: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            color,
            week_days: dedup_week_days(week_days),
            is_reminder_on: false,
            reminder_text: String::new(),
            notification_time: current_minute(),
            notification_ids: Vec::new(),
            date_added: now_epoch_ms(),
        }
    }

    /// Checks record completeness.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is empty.
    /// - `NoWeekDays` when no weekday is active.
    /// - `DuplicateWeekDay` when a weekday name repeats.
    /// - `MissingReminderText` when reminders are on without text.
    /// - `TimeHasSeconds` when `notification_time` is not minute-aligned.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        validate_fields(
            &self.title,
            &self.week_days,
            self.is_reminder_on,
            &self.reminder_text,
            self.notification_time,
        )
    }
}

pub(crate) fn validate_fields(
    title: &str,
    week_days: &[String],
    is_reminder_on: bool,
    reminder_text: &str,
    time: NaiveTime,
) -> Result<(), HabitValidationError> {
    if title.is_empty() {
        return Err(HabitValidationError::EmptyTitle);
    }
    if week_days.is_empty() {
        return Err(HabitValidationError::NoWeekDays);
    }
    if week_days
        .iter()
        .enumerate()
        .any(|(index, day)| week_days[..index].contains(day))
    {
        return Err(HabitValidationError::DuplicateWeekDay);
    }
    if is_reminder_on && reminder_text.is_empty() {
        return Err(HabitValidationError::MissingReminderText);
    }
    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(HabitValidationError::TimeHasSeconds);
    }
    Ok(())
}

/// Drops repeated weekday names, keeping the first occurrence.
pub(crate) fn dedup_week_days(week_days: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(week_days.len());
    for day in week_days {
        if !unique.contains(&day) {
            unique.push(day);
        }
    }
    unique
}

/// Current local time truncated to the minute.
pub(crate) fn current_minute() -> NaiveTime {
    let now = chrono::Local::now().time();
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_default()
}

pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{Habit, HabitColor, HabitValidationError};
    use chrono::{NaiveTime, Timelike};

    #[test]
    fn color_ids_parse_back() {
        for color in HabitColor::ALL {
            assert_eq!(HabitColor::parse(color.as_str()), Some(color));
        }
        assert_eq!(HabitColor::parse("card-8"), None);
        assert_eq!(HabitColor::default(), HabitColor::Card1);
    }

    #[test]
    fn habit_serializes_color_as_palette_id() {
        let habit = Habit::new("Sleep early", HabitColor::Card6, vec!["Monday".into()]);
        let json = serde_json::to_value(&habit).expect("habit should serialize");
        assert_eq!(json["color"], "card-6");

        let back: Habit = serde_json::from_value(json).expect("habit should deserialize");
        assert_eq!(back, habit);
    }

    #[test]
    fn new_habit_dedups_week_days_and_zeroes_seconds() {
        let habit = Habit::new(
            "Read",
            HabitColor::Card3,
            vec!["Monday".into(), "Friday".into(), "Monday".into()],
        );
        assert_eq!(habit.week_days, vec!["Monday", "Friday"]);
        assert_eq!(habit.notification_time.second(), 0);
        assert!(habit.notification_ids.is_empty());
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut habit = Habit::new("", HabitColor::Card1, Vec::new());
        assert_eq!(habit.validate(), Err(HabitValidationError::EmptyTitle));

        habit.title = "Walk".into();
        assert_eq!(habit.validate(), Err(HabitValidationError::NoWeekDays));

        habit.week_days = vec!["Sunday".into()];
        habit.is_reminder_on = true;
        assert_eq!(
            habit.validate(),
            Err(HabitValidationError::MissingReminderText)
        );

        habit.reminder_text = "go outside".into();
        assert_eq!(habit.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_repeated_days_and_second_precision() {
        let mut habit = Habit::new("Stretch", HabitColor::Card2, vec!["Monday".into()]);
        habit.notification_time = NaiveTime::from_hms_opt(6, 15, 0).expect("valid time");
        assert_eq!(habit.validate(), Ok(()));

        habit.week_days = vec!["Monday".into(), "Tuesday".into(), "Monday".into()];
        assert_eq!(habit.validate(), Err(HabitValidationError::DuplicateWeekDay));

        habit.week_days = vec!["Monday".into()];
        habit.notification_time = NaiveTime::from_hms_opt(6, 15, 42).expect("valid time");
        assert_eq!(habit.validate(), Err(HabitValidationError::TimeHasSeconds));
    }
}
