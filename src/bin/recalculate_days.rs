//! Utility to recompute every day's cached totals from its food items.
//! Usage: cargo run --bin recalculate_days

use std::path::PathBuf;

fn get_database_path() -> PathBuf {
    std::env::var("FITLOG_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("fitlog.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_database_path();
    println!("Database: {}", db_path.display());

    let database = fitlog::db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        fitlog::db::migrations::run_migrations(conn)?;

        let mut offset = 0;
        let mut changed = 0;
        let mut checked = 0;

        loop {
            let days = fitlog::models::DayRecord::list(conn, None, None, 200, offset)?;
            if days.is_empty() {
                break;
            }
            offset += days.len() as i64;

            for day in days {
                let totals = fitlog::models::recalculate_day_totals(conn, day.id)?;
                checked += 1;

                if totals != day.totals {
                    changed += 1;
                    println!(
                        "{}: {:.0} kcal -> {:.0} kcal",
                        day.date, day.totals.calories, totals.calories
                    );
                }
            }
        }

        println!("Checked {} days, corrected {}", checked, changed);
        Ok(())
    })?;

    Ok(())
}
