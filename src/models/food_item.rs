//! Food item model
//!
//! A single logged food entry, owned by exactly one day.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{DayRecord, MacroTotals};

/// A logged food entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub day_id: i64,
    pub name: String, // free text, may be empty
    pub macros: MacroTotals,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemCreate {
    pub day_id: i64,
    pub name: String,
    pub macros: MacroTotals,
}

/// Data for updating a food item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodItemUpdate {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl FoodItem {
    /// Create a FoodItem from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            day_id: row.get("day_id")?,
            name: row.get("name")?,
            macros: MacroTotals {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fats: row.get("fats")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new food item. The caller recalculates the owning day's
    /// totals afterwards.
    pub fn create(conn: &Connection, data: &FoodItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO food_items (day_id, name, calories, protein, carbs, fats)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.day_id,
                data.name,
                data.macros.calories,
                data.macros.protein,
                data.macros.carbs,
                data.macros.fats,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a food item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All food items for a day, sorted by name. The sort is display-only;
    /// the totals below do not depend on it.
    pub fn list_for_day(conn: &Connection, day_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM food_items WHERE day_id = ?1 ORDER BY name, id")?;

        let items = stmt
            .query_map([day_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Count food items, optionally restricted to a date range on the owning day
    pub fn count_in_range(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<i64> {
        let mut sql = String::from(
            "SELECT COUNT(*) FROM food_items f JOIN days d ON f.day_id = d.id WHERE 1=1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND d.date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND d.date <= ?{}", params_vec.len()));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let count: i64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Update a food item. The caller recalculates the owning day's totals
    /// afterwards.
    pub fn update(conn: &Connection, id: i64, data: &FoodItemUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(calories) = data.calories {
            updates.push(format!("calories = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(calories));
        }
        if let Some(protein) = data.protein {
            updates.push(format!("protein = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(protein));
        }
        if let Some(carbs) = data.carbs {
            updates.push(format!("carbs = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(carbs));
        }
        if let Some(fats) = data.fats {
            updates.push(format!("fats = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(fats));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE food_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a food item. Returns the owning day's ID so the caller can
    /// recalculate, or None if the item did not exist.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<Option<i64>> {
        let item = match Self::get_by_id(conn, id)? {
            Some(item) => item,
            None => return Ok(None),
        };

        conn.execute("DELETE FROM food_items WHERE id = ?1", [id])?;
        Ok(Some(item.day_id))
    }
}

/// Sum the four macro fields across a day's current food items
pub fn sum_for_day(conn: &Connection, day_id: i64) -> DbResult<MacroTotals> {
    let items = FoodItem::list_for_day(conn, day_id)?;
    Ok(items.iter().map(|i| i.macros.clone()).sum())
}

/// Recalculate a day's cached totals from its current food items and persist
/// them. Returns the recalculated totals.
pub fn recalculate_day_totals(conn: &Connection, day_id: i64) -> DbResult<MacroTotals> {
    let totals = sum_for_day(conn, day_id)?;
    DayRecord::update_totals(conn, day_id, &totals)?;
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn add_item(conn: &Connection, day_id: i64, name: &str, macros: MacroTotals) -> FoodItem {
        FoodItem::create(
            conn,
            &FoodItemCreate {
                day_id,
                name: name.to_string(),
                macros,
            },
        )
        .unwrap()
    }

    fn macros(calories: f64, protein: f64, carbs: f64, fats: f64) -> MacroTotals {
        MacroTotals {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    #[test]
    fn test_recalculate_after_adds() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();

        add_item(&conn, day.id, "oatmeal", macros(100.0, 5.0, 10.0, 2.0));
        add_item(&conn, day.id, "chicken", macros(200.0, 10.0, 20.0, 5.0));

        let totals = recalculate_day_totals(&conn, day.id).unwrap();
        assert_eq!(totals, macros(300.0, 15.0, 30.0, 7.0));

        let stored = DayRecord::get_by_id(&conn, day.id).unwrap().unwrap();
        assert_eq!(stored.totals, totals);
    }

    #[test]
    fn test_recalculate_after_delete_matches_remaining_item() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();

        let first = add_item(&conn, day.id, "oatmeal", macros(100.0, 5.0, 10.0, 2.0));
        add_item(&conn, day.id, "chicken", macros(200.0, 10.0, 20.0, 5.0));
        recalculate_day_totals(&conn, day.id).unwrap();

        let day_id = FoodItem::delete(&conn, first.id).unwrap();
        assert_eq!(day_id, Some(day.id));

        let totals = recalculate_day_totals(&conn, day.id).unwrap();
        assert_eq!(totals, macros(200.0, 10.0, 20.0, 5.0));
    }

    #[test]
    fn test_recalculate_empty_day_is_zero() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();

        let totals = recalculate_day_totals(&conn, day.id).unwrap();
        assert_eq!(totals, MacroTotals::zero());
    }

    #[test]
    fn test_recalculate_is_idempotent_without_mutation() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();
        add_item(&conn, day.id, "toast", macros(80.0, 3.0, 14.0, 1.0));

        let first = recalculate_day_totals(&conn, day.id).unwrap();
        let second = recalculate_day_totals(&conn, day.id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_recalculate_after_edit() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();
        let item = add_item(&conn, day.id, "toast", macros(80.0, 3.0, 14.0, 1.0));
        recalculate_day_totals(&conn, day.id).unwrap();

        FoodItem::update(
            &conn,
            item.id,
            &FoodItemUpdate {
                calories: Some(120.0),
                ..FoodItemUpdate::default()
            },
        )
        .unwrap();

        let totals = recalculate_day_totals(&conn, day.id).unwrap();
        assert_eq!(totals.calories, 120.0);
        assert_eq!(totals.protein, 3.0);
    }

    #[test]
    fn test_day_delete_cascades_to_items() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();
        let item = add_item(&conn, day.id, "toast", macros(80.0, 3.0, 14.0, 1.0));

        assert!(DayRecord::delete(&conn, day.id).unwrap());
        assert!(FoodItem::get_by_id(&conn, item.id).unwrap().is_none());
    }

    #[test]
    fn test_list_for_day_sorts_by_name() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();
        add_item(&conn, day.id, "zucchini", macros(20.0, 1.0, 4.0, 0.0));
        add_item(&conn, day.id, "apple", macros(95.0, 0.5, 25.0, 0.3));

        let items = FoodItem::list_for_day(&conn, day.id).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "zucchini"]);
    }

    #[test]
    fn test_count_in_range() {
        let conn = test_conn();
        let d1 = DayRecord::create(&conn, "2025-02-15").unwrap();
        let d2 = DayRecord::create(&conn, "2025-02-16").unwrap();
        add_item(&conn, d1.id, "a", macros(1.0, 0.0, 0.0, 0.0));
        add_item(&conn, d2.id, "b", macros(1.0, 0.0, 0.0, 0.0));
        add_item(&conn, d2.id, "c", macros(1.0, 0.0, 0.0, 0.0));

        assert_eq!(FoodItem::count_in_range(&conn, None, None).unwrap(), 3);
        assert_eq!(
            FoodItem::count_in_range(&conn, Some("2025-02-16"), None).unwrap(),
            2
        );
    }

    #[test]
    fn test_delete_missing_item() {
        let conn = test_conn();
        assert_eq!(FoodItem::delete(&conn, 42).unwrap(), None);
    }
}
