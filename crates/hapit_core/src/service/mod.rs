//! Core use-case services.
//!
//! # Responsibility
//! - Drive the habit form: draft edits, commit, remove (`habit_editor`).
//! - Project stored habits into weekly cards (`habit_card`).
//! - Keep UI/FFI layers decoupled from storage and platform details.

pub mod habit_card;
pub mod habit_editor;
