//! Weekly progress card projection for the habit list.
//!
//! # Invariants
//! - `days` always holds 7 cells, Sunday through Saturday, for the week that
//!   contains the reference date.

use crate::calendar::{weekday_symbol, WEEKDAY_SYMBOLS};
use crate::model::habit::{Habit, HabitColor, HabitId};
use chrono::{Datelike, Days, NaiveDate};

/// One weekday column of a habit card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitCardDay {
    pub week_day: &'static str,
    pub date: NaiveDate,
    pub is_active: bool,
}

/// Display-ready summary of one habit for the current week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitCard {
    pub habit_id: HabitId,
    pub title: String,
    pub color: HabitColor,
    pub has_reminder: bool,
    /// `"Everyday"` or `"{n} times a week"`.
    pub frequency_label: String,
    pub days: Vec<HabitCardDay>,
}

/// Builds the card for `habit` in the week containing `today`.
pub fn habit_card(habit: &Habit, today: NaiveDate) -> HabitCard {
    let week_start = today
        .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_sunday())))
        .unwrap_or(today);

    let days = (0..WEEKDAY_SYMBOLS.len() as u64)
        .map(|offset| {
            let date = week_start
                .checked_add_days(Days::new(offset))
                .unwrap_or(week_start);
            let week_day = weekday_symbol(date.weekday());
            HabitCardDay {
                week_day,
                date,
                is_active: habit.week_days.iter().any(|day| day == week_day),
            }
        })
        .collect();

    HabitCard {
        habit_id: habit.id,
        title: habit.title.clone(),
        color: habit.color,
        has_reminder: habit.is_reminder_on,
        frequency_label: frequency_label(habit),
        days,
    }
}

/// Builds cards for a list of habits, preserving their order.
pub fn habit_cards(habits: &[Habit], today: NaiveDate) -> Vec<HabitCard> {
    habits.iter().map(|habit| habit_card(habit, today)).collect()
}

/// Counts stored day names, so unrecognized names still count toward the week.
fn frequency_label(habit: &Habit) -> String {
    if habit.week_days.len() == WEEKDAY_SYMBOLS.len() {
        "Everyday".to_string()
    } else {
        format!("{} times a week", habit.week_days.len())
    }
}
