//! Exercise MCP tools
//!
//! Tools for logging workout entries against a day.

use serde::Serialize;

use crate::db::Database;
use crate::models::{parse_or_zero, DayRecord, Exercise, ExerciseCreate, ExerciseUpdate};
use super::days::validate_date;

/// Response for log_exercise
#[derive(Debug, Serialize)]
pub struct LogExerciseResponse {
    pub id: i64,
    pub day_id: i64,
    pub date: String,
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub performed_at: String,
}

/// Response for list_exercises
#[derive(Debug, Serialize)]
pub struct ListExercisesResponse {
    pub date: String,
    pub exercises: Vec<Exercise>,
    pub total_minutes: f64,
    pub total_calories_burned: f64,
}

/// Log an exercise for a day, creating the day if needed. Numeric fields use
/// the same parse-or-zero discipline as food items.
pub fn log_exercise(
    db: &Database,
    date: &str,
    name: &str,
    duration_minutes: Option<&str>,
    calories_burned: Option<&str>,
    performed_at: Option<String>,
) -> Result<LogExerciseResponse, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = DayRecord::get_or_create(&conn, date)
        .map_err(|e| format!("Failed to get/create day: {}", e))?;

    let exercise = Exercise::create(
        &conn,
        &ExerciseCreate {
            day_id: day.id,
            name: name.to_string(),
            duration_minutes: parse_or_zero(duration_minutes),
            calories_burned: parse_or_zero(calories_burned),
            performed_at,
        },
    )
    .map_err(|e| format!("Failed to log exercise: {}", e))?;

    Ok(LogExerciseResponse {
        id: exercise.id,
        day_id: day.id,
        date: day.date,
        name: exercise.name,
        duration_minutes: exercise.duration_minutes,
        calories_burned: exercise.calories_burned,
        performed_at: exercise.performed_at,
    })
}

/// List a day's exercises with session totals
pub fn list_exercises(db: &Database, date: &str) -> Result<Option<ListExercisesResponse>, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = DayRecord::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?;

    match day {
        Some(day) => {
            let exercises = Exercise::list_for_day(&conn, day.id)
                .map_err(|e| format!("Failed to get exercises: {}", e))?;

            let total_minutes = exercises.iter().map(|e| e.duration_minutes).sum();
            let total_calories_burned = exercises.iter().map(|e| e.calories_burned).sum();

            Ok(Some(ListExercisesResponse {
                date: day.date,
                exercises,
                total_minutes,
                total_calories_burned,
            }))
        }
        None => Ok(None),
    }
}

/// Update an exercise entry
pub fn update_exercise(
    db: &Database,
    id: i64,
    name: Option<String>,
    duration_minutes: Option<&str>,
    calories_burned: Option<&str>,
    performed_at: Option<String>,
) -> Result<Option<Exercise>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = ExerciseUpdate {
        name,
        duration_minutes: duration_minutes.map(|s| parse_or_zero(Some(s))),
        calories_burned: calories_burned.map(|s| parse_or_zero(Some(s))),
        performed_at,
    };

    Exercise::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update exercise: {}", e))
}

/// Delete an exercise entry
pub fn delete_exercise(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Exercise::delete(&conn, id).map_err(|e| format!("Failed to delete exercise: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_exercise_creates_day() {
        let db = Database::open_in_memory().unwrap();

        let logged = log_exercise(
            &db,
            "2025-02-16",
            "treadmill",
            Some("30"),
            Some("180"),
            None,
        )
        .unwrap();
        assert_eq!(logged.date, "2025-02-16");
        assert_eq!(logged.duration_minutes, 30.0);
        assert_eq!(logged.calories_burned, 180.0);
    }

    #[test]
    fn test_unparsable_duration_counts_as_zero() {
        let db = Database::open_in_memory().unwrap();

        let logged =
            log_exercise(&db, "2025-02-16", "stretching", Some("a while"), None, None).unwrap();
        assert_eq!(logged.duration_minutes, 0.0);
        assert_eq!(logged.calories_burned, 0.0);
    }

    #[test]
    fn test_list_exercises_totals_sessions() {
        let db = Database::open_in_memory().unwrap();
        log_exercise(&db, "2025-02-16", "treadmill", Some("30"), Some("180"), None).unwrap();
        log_exercise(&db, "2025-02-16", "rowing", Some("20"), Some("150"), None).unwrap();

        let listed = list_exercises(&db, "2025-02-16").unwrap().unwrap();
        assert_eq!(listed.exercises.len(), 2);
        assert_eq!(listed.total_minutes, 50.0);
        assert_eq!(listed.total_calories_burned, 330.0);
    }

    #[test]
    fn test_list_exercises_missing_day() {
        let db = Database::open_in_memory().unwrap();
        assert!(list_exercises(&db, "2025-02-16").unwrap().is_none());
    }

    #[test]
    fn test_update_and_delete_exercise() {
        let db = Database::open_in_memory().unwrap();
        let logged =
            log_exercise(&db, "2025-02-16", "treadmill", Some("30"), Some("180"), None).unwrap();

        let updated = update_exercise(&db, logged.id, None, Some("45"), None, None)
            .unwrap()
            .unwrap();
        assert_eq!(updated.duration_minutes, 45.0);

        assert!(delete_exercise(&db, logged.id).unwrap());
        assert!(!delete_exercise(&db, logged.id).unwrap());
    }
}
