//! In-memory draft of a habit being created or edited.
//!
//! # Responsibility
//! - Hold form fields separately from persisted records.
//! - Apply single-field edit commands without cross-field validation.
//!
//! # Invariants
//! - `week_days` never holds duplicates.
//! - `reminder_time` has zero seconds.

use super::habit::{
    current_minute, dedup_week_days, validate_fields, Habit, HabitColor, HabitValidationError,
};
use chrono::{NaiveTime, Timelike};

/// Single-field mutation issued by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    Title(String),
    Color(HabitColor),
    /// Adds the day when absent, removes it when present.
    ToggleWeekDay(String),
    /// Replaces the full weekday set.
    WeekDays(Vec<String>),
    ReminderOn(bool),
    ReminderText(String),
    ReminderTime(NaiveTime),
}

/// Draft field set for the habit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub title: String,
    pub color: HabitColor,
    pub week_days: Vec<String>,
    pub is_reminder_on: bool,
    pub reminder_text: String,
    pub reminder_time: NaiveTime,
}

impl Default for HabitDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            color: HabitColor::default(),
            week_days: Vec::new(),
            is_reminder_on: false,
            reminder_text: String::new(),
            reminder_time: current_minute(),
        }
    }
}

impl HabitDraft {
    /// Copies the editable fields of a persisted habit.
    pub fn from_habit(habit: &Habit) -> Self {
        Self {
            title: habit.title.clone(),
            color: habit.color,
            week_days: habit.week_days.clone(),
            is_reminder_on: habit.is_reminder_on,
            reminder_text: habit.reminder_text.clone(),
            reminder_time: habit.notification_time,
        }
    }

    /// Applies one edit command.
    pub fn apply(&mut self, edit: DraftEdit) {
        match edit {
            DraftEdit::Title(title) => self.title = title,
            DraftEdit::Color(color) => self.color = color,
            DraftEdit::ToggleWeekDay(day) => {
                if let Some(index) = self.week_days.iter().position(|value| *value == day) {
                    self.week_days.remove(index);
                } else {
                    self.week_days.push(day);
                }
            }
            DraftEdit::WeekDays(days) => self.week_days = dedup_week_days(days),
            DraftEdit::ReminderOn(on) => self.is_reminder_on = on,
            DraftEdit::ReminderText(text) => self.reminder_text = text,
            DraftEdit::ReminderTime(time) => {
                self.reminder_time =
                    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
            }
        }
    }

    /// Returns whether the draft can be committed.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// Same rules as [`Habit::validate`], applied to draft fields.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        validate_fields(
            &self.title,
            &self.week_days,
            self.is_reminder_on,
            &self.reminder_text,
            self.reminder_time,
        )
    }

    /// Resets every field to its default. Reminder time becomes the current
    /// local minute.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Writes draft fields onto a record, keeping its id, `date_added` and
    /// notification ids.
    pub fn write_into(&self, habit: &mut Habit) {
        habit.title = self.title.clone();
        habit.color = self.color;
        habit.week_days = self.week_days.clone();
        habit.is_reminder_on = self.is_reminder_on;
        habit.reminder_text = self.reminder_text.clone();
        habit.notification_time = self.reminder_time;
    }
}
