//! Statistics tools
//!
//! Date-range summaries over day records and exercises, computed from the
//! cached day totals.

use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodItem, MacroTotals};
use super::days::validate_date;

/// Response for day_stats
#[derive(Debug, Serialize)]
pub struct DayStatsResponse {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub days_logged: i64,
    pub food_items_logged: i64,
    pub intake_totals: MacroTotals,
    pub intake_daily_average: MacroTotals,
    pub exercise_sessions: i64,
    pub exercise_minutes: f64,
    pub exercise_calories_burned: f64,
    pub net_calories: f64,
}

/// Summarize logged days over an optional inclusive date range
pub fn day_stats(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<DayStatsResponse, String> {
    if let Some(start) = start_date {
        validate_date(start)?;
    }
    if let Some(end) = end_date {
        validate_date(end)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut day_sql = String::from(
        "SELECT COUNT(*), \
                COALESCE(SUM(total_calories), 0), \
                COALESCE(SUM(total_protein), 0), \
                COALESCE(SUM(total_carbs), 0), \
                COALESCE(SUM(total_fats), 0) \
         FROM days WHERE 1=1",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(start) = start_date {
        params_vec.push(Box::new(start.to_string()));
        day_sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
    }
    if let Some(end) = end_date {
        params_vec.push(Box::new(end.to_string()));
        day_sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
    }

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

    let (days_logged, intake_totals) = conn
        .query_row(&day_sql, params_refs.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                MacroTotals {
                    calories: row.get(1)?,
                    protein: row.get(2)?,
                    carbs: row.get(3)?,
                    fats: row.get(4)?,
                },
            ))
        })
        .map_err(|e| format!("Failed to aggregate days: {}", e))?;

    let mut exercise_sql = String::from(
        "SELECT COUNT(*), \
                COALESCE(SUM(e.duration_minutes), 0), \
                COALESCE(SUM(e.calories_burned), 0) \
         FROM exercises e JOIN days d ON e.day_id = d.id WHERE 1=1",
    );
    let mut exercise_params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(start) = start_date {
        exercise_params.push(Box::new(start.to_string()));
        exercise_sql.push_str(&format!(" AND d.date >= ?{}", exercise_params.len()));
    }
    if let Some(end) = end_date {
        exercise_params.push(Box::new(end.to_string()));
        exercise_sql.push_str(&format!(" AND d.date <= ?{}", exercise_params.len()));
    }

    let exercise_refs: Vec<&dyn rusqlite::ToSql> =
        exercise_params.iter().map(|p| p.as_ref()).collect();

    let (exercise_sessions, exercise_minutes, exercise_calories_burned) = conn
        .query_row(&exercise_sql, exercise_refs.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })
        .map_err(|e| format!("Failed to aggregate exercises: {}", e))?;

    let food_items_logged = FoodItem::count_in_range(&conn, start_date, end_date)
        .map_err(|e| format!("Failed to count food items: {}", e))?;

    let intake_daily_average = intake_totals.per_day(days_logged);
    let net_calories = intake_totals.calories - exercise_calories_burned;

    Ok(DayStatsResponse {
        start_date: start_date.map(|s| s.to_string()),
        end_date: end_date.map(|s| s.to_string()),
        days_logged,
        food_items_logged,
        intake_totals,
        intake_daily_average,
        exercise_sessions,
        exercise_minutes,
        exercise_calories_burned,
        net_calories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::exercises::log_exercise;
    use crate::tools::food_items::{add_food_item, MacroFields};

    fn fields(calories: &str, protein: &str, carbs: &str, fats: &str) -> MacroFields {
        MacroFields {
            calories: Some(calories.to_string()),
            protein: Some(protein.to_string()),
            carbs: Some(carbs.to_string()),
            fats: Some(fats.to_string()),
        }
    }

    #[test]
    fn test_stats_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let stats = day_stats(&db, None, None).unwrap();
        assert_eq!(stats.days_logged, 0);
        assert_eq!(stats.intake_totals, MacroTotals::zero());
        assert_eq!(stats.intake_daily_average, MacroTotals::zero());
        assert_eq!(stats.exercise_sessions, 0);
        assert_eq!(stats.net_calories, 0.0);
    }

    #[test]
    fn test_stats_sums_and_averages() {
        let db = Database::open_in_memory().unwrap();
        add_food_item(&db, "2025-02-15", "oatmeal", fields("100", "5", "10", "2")).unwrap();
        add_food_item(&db, "2025-02-16", "chicken", fields("200", "10", "20", "5")).unwrap();
        add_food_item(&db, "2025-02-16", "rice", fields("100", "5", "10", "2")).unwrap();
        log_exercise(&db, "2025-02-16", "treadmill", Some("30"), Some("180"), None).unwrap();

        let stats = day_stats(&db, None, None).unwrap();
        assert_eq!(stats.days_logged, 2);
        assert_eq!(stats.food_items_logged, 3);
        assert_eq!(stats.intake_totals.calories, 400.0);
        assert_eq!(stats.intake_totals.protein, 20.0);
        assert_eq!(stats.intake_daily_average.calories, 200.0);
        assert_eq!(stats.exercise_sessions, 1);
        assert_eq!(stats.exercise_minutes, 30.0);
        assert_eq!(stats.exercise_calories_burned, 180.0);
        assert_eq!(stats.net_calories, 220.0);
    }

    #[test]
    fn test_stats_respects_date_range() {
        let db = Database::open_in_memory().unwrap();
        add_food_item(&db, "2025-02-15", "oatmeal", fields("100", "5", "10", "2")).unwrap();
        add_food_item(&db, "2025-02-16", "chicken", fields("200", "10", "20", "5")).unwrap();

        let stats = day_stats(&db, Some("2025-02-16"), Some("2025-02-16")).unwrap();
        assert_eq!(stats.days_logged, 1);
        assert_eq!(stats.food_items_logged, 1);
        assert_eq!(stats.intake_totals.calories, 200.0);
    }

    #[test]
    fn test_stats_rejects_bad_dates() {
        let db = Database::open_in_memory().unwrap();
        assert!(day_stats(&db, Some("yesterday"), None).is_err());
    }
}
