//! Day record model
//!
//! One calendar day of logged food intake with cached macro totals.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{FoodItem, MacroTotals};

/// A calendar day with cached nutrition totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    pub id: i64,
    pub date: String, // ISO date: "2025-02-16"
    pub totals: MacroTotals,
    pub created_at: String,
    pub updated_at: String,
}

impl DayRecord {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            totals: MacroTotals {
                calories: row.get("total_calories")?,
                protein: row.get("total_protein")?,
                carbs: row.get("total_carbs")?,
                fats: row.get("total_fats")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new day. Totals start at zero until the first recalculation.
    pub fn create(conn: &Connection, date: &str) -> DbResult<Self> {
        conn.execute("INSERT INTO days (date) VALUES (?1)", params![date])?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a day by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM days WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(day) => Ok(Some(day)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a day by date
    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM days WHERE date = ?1")?;

        let result = stmt.query_row([date], Self::from_row);
        match result {
            Ok(day) => Ok(Some(day)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get or create a day by date. Dates are unique, so a second call with
    /// the same date returns the existing record.
    pub fn get_or_create(conn: &Connection, date: &str) -> DbResult<Self> {
        if let Some(day) = Self::get_by_date(conn, date)? {
            return Ok(day);
        }

        Self::create(conn, date)
    }

    /// List days newest-first with an optional inclusive date range
    pub fn list(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM days WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date DESC");

        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        params_vec.push(Box::new(offset));
        sql.push_str(&format!(" OFFSET ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let days = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(days)
    }

    /// Count days with an optional inclusive date range
    pub fn count(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM days WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let count: i64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Persist recalculated totals for a day
    pub fn update_totals(conn: &Connection, id: i64, totals: &MacroTotals) -> DbResult<()> {
        conn.execute(
            r#"
            UPDATE days SET
                total_calories = ?1,
                total_protein = ?2,
                total_carbs = ?3,
                total_fats = ?4,
                updated_at = datetime('now')
            WHERE id = ?5
            "#,
            params![
                totals.calories,
                totals.protein,
                totals.carbs,
                totals.fats,
                id,
            ],
        )?;
        Ok(())
    }

    /// Delete a day. Owned food items and exercises go with it via cascade.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM days WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Recompute the four cached totals from the given food items, in place.
    ///
    /// A field-wise sum over the children: total over any finite collection,
    /// order-independent, and idempotent. An empty collection zeroes every
    /// total.
    pub fn recalculate_totals(&mut self, items: &[FoodItem]) {
        self.totals = items.iter().map(|i| i.macros.clone()).sum();
    }
}
