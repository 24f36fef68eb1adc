//! Day MCP tools
//!
//! Tools for managing day records and their cached totals.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::{
    recalculate_day_totals, sum_for_day, DayRecord, Exercise, FoodItem, MacroTotals,
};

/// Format totals the way the day views display them: whole calories, whole
/// grams for the macros.
pub fn format_totals(totals: &MacroTotals) -> String {
    format!(
        "{:.0} kcal | protein {:.0}g, carbs {:.0}g, fats {:.0}g",
        totals.calories, totals.protein, totals.carbs, totals.fats
    )
}

/// Check a user-supplied ISO date before it reaches the store
pub fn validate_date(date: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {}", date))
}

/// Recompute a day's totals from its current food items and persist them.
///
/// A failed write of the cached row is logged and otherwise ignored: the
/// returned totals are recomputed from the items and therefore correct, and
/// the next successful save or a manual recalculation re-syncs the stored row.
pub(crate) fn refresh_day_totals(conn: &Connection, day_id: i64) -> Result<MacroTotals, String> {
    let totals =
        sum_for_day(conn, day_id).map_err(|e| format!("Failed to total food items: {}", e))?;

    if let Err(e) = DayRecord::update_totals(conn, day_id, &totals) {
        tracing::error!(day_id, error = %e, "failed to persist recalculated day totals");
    }

    Ok(totals)
}

/// Response for add_day
#[derive(Debug, Serialize)]
pub struct AddDayResponse {
    pub id: i64,
    pub date: String,
    pub created: bool, // true if newly created, false if the date already existed
    pub totals: MacroTotals,
    pub display: String,
}

/// Day with food items and exercises for detailed view
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub id: i64,
    pub date: String,
    pub totals: MacroTotals,
    pub display: String,
    pub items: Vec<FoodItem>,
    pub exercises: Vec<Exercise>,
}

/// Day summary for listing
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub id: i64,
    pub date: String,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    pub item_count: usize,
    pub display: String,
}

/// Response for list_days
#[derive(Debug, Serialize)]
pub struct ListDaysResponse {
    pub days: Vec<DaySummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for recalculate_day
#[derive(Debug, Serialize)]
pub struct RecalculateDayResponse {
    pub day_id: i64,
    pub date: String,
    pub totals: MacroTotals,
    pub display: String,
}

/// Add a day (or return the existing record for that date). Totals are
/// established through the aggregator so a fresh day reads as all zeros.
pub fn add_day(db: &Database, date: &str) -> Result<AddDayResponse, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = DayRecord::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to check day: {}", e))?;
    let created = existing.is_none();

    let day = match existing {
        Some(day) => day,
        None => DayRecord::create(&conn, date)
            .map_err(|e| format!("Failed to create day: {}", e))?,
    };

    let totals = refresh_day_totals(&conn, day.id)?;
    let display = format_totals(&totals);

    Ok(AddDayResponse {
        id: day.id,
        date: day.date,
        created,
        totals,
        display,
    })
}

/// Get a day with its food items (sorted by name) and exercises
pub fn get_day(db: &Database, date: &str) -> Result<Option<DayDetail>, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = DayRecord::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?;

    match day {
        Some(day) => {
            let items = FoodItem::list_for_day(&conn, day.id)
                .map_err(|e| format!("Failed to get food items: {}", e))?;
            let exercises = Exercise::list_for_day(&conn, day.id)
                .map_err(|e| format!("Failed to get exercises: {}", e))?;

            let display = format_totals(&day.totals);

            Ok(Some(DayDetail {
                id: day.id,
                date: day.date,
                totals: day.totals,
                display,
                items,
                exercises,
            }))
        }
        None => Ok(None),
    }
}

/// List days newest-first with an optional date range
pub fn list_days(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListDaysResponse, String> {
    if let Some(start) = start_date {
        validate_date(start)?;
    }
    if let Some(end) = end_date {
        validate_date(end)?;
    }

    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let days = DayRecord::list(&conn, start_date, end_date, limit, offset)
        .map_err(|e| format!("Failed to list days: {}", e))?;

    let total = DayRecord::count(&conn, start_date, end_date)
        .map_err(|e| format!("Failed to count days: {}", e))?;

    let mut summaries = Vec::new();
    for day in days {
        let items = FoodItem::list_for_day(&conn, day.id)
            .map_err(|e| format!("Failed to get food items: {}", e))?;

        let display = format_totals(&day.totals);
        summaries.push(DaySummary {
            id: day.id,
            date: day.date,
            total_calories: day.totals.calories,
            total_protein: day.totals.protein,
            total_carbs: day.totals.carbs,
            total_fats: day.totals.fats,
            item_count: items.len(),
            display,
        });
    }

    Ok(ListDaysResponse {
        days: summaries,
        total,
        limit,
        offset,
    })
}

/// Delete a day. Owned food items and exercises cascade with it.
pub fn delete_day(db: &Database, date: &str) -> Result<bool, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = DayRecord::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?;

    match day {
        Some(day) => DayRecord::delete(&conn, day.id)
            .map_err(|e| format!("Failed to delete day: {}", e)),
        None => Ok(false),
    }
}

/// Force a full recalculation of a day's totals. Unlike the per-mutation
/// refresh, a failed write here is reported to the caller.
pub fn recalculate_day(db: &Database, date: &str) -> Result<RecalculateDayResponse, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = DayRecord::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?
        .ok_or_else(|| format!("Day not found: {}", date))?;

    let totals = recalculate_day_totals(&conn, day.id)
        .map_err(|e| format!("Failed to recalculate totals: {}", e))?;
    let display = format_totals(&totals);

    Ok(RecalculateDayResponse {
        day_id: day.id,
        date: day.date,
        totals,
        display,
    })
}
