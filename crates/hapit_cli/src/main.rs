//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `hapit_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use hapit_core::db::{migrations, open_db_in_memory};
use hapit_core::{HabitRepository, SqliteHabitRepository, WEEKDAY_SYMBOLS};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("hapit_core ping={}", hapit_core::ping());
    println!("hapit_core version={}", hapit_core::core_version());
    println!("hapit_core week_days={}", WEEKDAY_SYMBOLS.join(","));

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("hapit_core db_open failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    match migrations::current_user_version(&conn) {
        Ok(version) => println!("hapit_core schema_version={version}"),
        Err(err) => {
            eprintln!("hapit_core schema_version failed: {err}");
            return ExitCode::FAILURE;
        }
    }

    let habit_count = SqliteHabitRepository::try_new(&conn)
        .and_then(|repo| repo.list_habits())
        .map(|habits| habits.len());
    match habit_count {
        Ok(count) => {
            println!("hapit_core habits={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("hapit_core habit_list failed: {err}");
            ExitCode::FAILURE
        }
    }
}
