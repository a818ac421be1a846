//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the habit record store contract.
//! - Isolate SQLite query details from the editor service.
//!
//! # Invariants
//! - Repository writes enforce `Habit::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod habit_repo;
