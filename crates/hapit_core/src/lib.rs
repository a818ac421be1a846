//! Core domain logic for Hapit, a personal habit tracker.
//! This crate is the single source of truth for habit invariants.

pub mod calendar;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use calendar::{weekday_position, WEEKDAY_SYMBOLS};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::draft::{DraftEdit, HabitDraft};
pub use model::habit::{Habit, HabitColor, HabitId, HabitValidationError};
pub use notify::outbox::SqliteNotificationOutbox;
pub use notify::{
    NotificationContent, NotificationRequest, NotificationService, NotifyError, NotifyResult,
    WeeklyTrigger,
};
pub use repo::habit_repo::{HabitRepository, RepoError, RepoResult, SqliteHabitRepository};
pub use service::habit_card::{habit_card, habit_cards, HabitCard, HabitCardDay};
pub use service::habit_editor::{CommitError, HabitEditor, NotificationPermission};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
