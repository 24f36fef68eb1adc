//! Status tool
//!
//! Runtime status information and the usage guide served to clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage guide for AI assistants driving the fitlog tools
pub const USAGE_INSTRUCTIONS: &str = r#"
# fitlog Usage Instructions

fitlog tracks daily food intake and exercise. Each calendar day has one day
record; food items and exercises attach to it, and the day's calorie/protein/
carb/fat totals are recomputed automatically after every food item change.

## Dates

All dates use ISO format: YYYY-MM-DD. A date identifies at most one day record.
Days are created automatically when you log the first food item or exercise for
a date, or explicitly with `add_day`.

## Numeric fields are free text

`calories`, `protein`, `carbs`, `fats`, `duration_minutes`, and
`calories_burned` are passed as strings, the way they arrive from a form field.
Anything missing, empty, or unparsable counts as 0 - logging an item with no
calorie value is fine and simply contributes nothing to the totals.

## Logging food

1. `add_food_item(date, name, calories, protein, carbs, fats)` - creates the
   day if needed, stores the item, and returns the day's updated totals.
2. `update_food_item(id, ...)` - edit any field; totals are recomputed
   immediately and returned in the response.
3. `delete_food_item(id)` - removes the item and returns the day's new totals.

The `day_totals` in every response are already recalculated - there is no need
to call anything else after a mutation.

## Viewing days

- `get_day(date)` - the day with its items (sorted by name) and exercises.
- `list_days(start_date?, end_date?, limit, offset)` - newest first.
- `delete_day(date)` - removes the day and everything logged under it.
- `recalculate_day(date)` - force a full re-sync of the cached totals. Only
  needed if a previous save reported a persistence failure in the logs.

## Logging exercise

- `log_exercise(date, name, duration_minutes, calories_burned, performed_at?)`
- `list_exercises(date)` - a day's sessions with summed minutes and calories.
- `update_exercise(id, ...)` / `delete_exercise(id)`

## Statistics

`day_stats(start_date?, end_date?)` summarizes the range: days logged, food
items logged, summed intake totals, per-day averages, exercise sessions/minutes/
calories burned, and net calories (intake minus burned).

## Display conventions

`display` strings format calories as whole kcal and macros as whole grams,
e.g. "300 kcal | protein 15g, carbs 30g, fats 7g".
"#;

/// Runtime status of the fitlog service
#[derive(Debug, Clone, Serialize)]
pub struct FitlogStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> FitlogStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FitlogStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
