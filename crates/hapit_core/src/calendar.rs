//! Weekday vocabulary shared by habits, triggers and card projections.
//!
//! Positions follow the Gregorian calendar: Sunday is 1, Saturday is 7.

use chrono::Weekday;

/// Fixed weekday names accepted in `Habit::week_days`.
pub const WEEKDAY_SYMBOLS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Returns the 1-based position of a weekday name, or `None` for names
/// outside the vocabulary.
pub fn weekday_position(name: &str) -> Option<u8> {
    WEEKDAY_SYMBOLS
        .iter()
        .position(|symbol| *symbol == name)
        .and_then(|index| u8::try_from(index + 1).ok())
}

/// Returns the vocabulary name for a chrono weekday.
pub fn weekday_symbol(day: Weekday) -> &'static str {
    WEEKDAY_SYMBOLS[day.num_days_from_sunday() as usize]
}
