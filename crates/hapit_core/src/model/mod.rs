//! Domain model for habits and the habit form.
//!
//! # Responsibility
//! - Define the persisted `Habit` record and its color palette.
//! - Define the in-memory `HabitDraft` edited by the habit form.
//!
//! # Invariants
//! - Every persisted habit is identified by a stable `HabitId`.
//! - Records and drafts share one completeness rule set.

pub mod draft;
pub mod habit;
