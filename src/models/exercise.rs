//! Exercise model
//!
//! A logged workout entry (name, duration, calories burned), owned by a day.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A logged exercise session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub day_id: i64,
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub performed_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCreate {
    pub day_id: i64,
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub performed_at: Option<String>,
}

/// Data for updating an exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseUpdate {
    pub name: Option<String>,
    pub duration_minutes: Option<f64>,
    pub calories_burned: Option<f64>,
    pub performed_at: Option<String>,
}

impl Exercise {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            day_id: row.get("day_id")?,
            name: row.get("name")?,
            duration_minutes: row.get("duration_minutes")?,
            calories_burned: row.get("calories_burned")?,
            performed_at: row.get("performed_at")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new exercise entry
    pub fn create(conn: &Connection, data: &ExerciseCreate) -> DbResult<Self> {
        let performed_at = data
            .performed_at
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());

        conn.execute(
            r#"
            INSERT INTO exercises (day_id, name, duration_minutes, calories_burned, performed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.day_id,
                data.name,
                data.duration_minutes,
                data.calories_burned,
                performed_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get an exercise by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List exercises for a day in the order they were performed
    pub fn list_for_day(conn: &Connection, day_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM exercises WHERE day_id = ?1 ORDER BY performed_at, id")?;
        let exercises = stmt
            .query_map([day_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(exercises)
    }

    /// List exercises whose owning day falls in an inclusive date range
    pub fn list_by_date_range(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from(
            "SELECT e.* FROM exercises e JOIN days d ON e.day_id = d.id WHERE 1=1",
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

        sql.push_str(" ORDER BY e.performed_at DESC, e.id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let exercises = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(exercises)
    }

    /// Update an exercise
    pub fn update(conn: &Connection, id: i64, data: &ExerciseUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(duration) = data.duration_minutes {
            updates.push(format!("duration_minutes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(duration));
        }
        if let Some(calories) = data.calories_burned {
            updates.push(format!("calories_burned = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(calories));
        }
        if let Some(ref performed_at) = data.performed_at {
            updates.push(format!("performed_at = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(performed_at.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE exercises SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete an exercise
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM exercises WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::DayRecord;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn log(conn: &Connection, day_id: i64, name: &str, minutes: f64, burned: f64) -> Exercise {
        Exercise::create(
            conn,
            &ExerciseCreate {
                day_id,
                name: name.to_string(),
                duration_minutes: minutes,
                calories_burned: burned,
                performed_at: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_defaults_performed_at() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();
        let exercise = log(&conn, day.id, "treadmill", 30.0, 180.0);
        assert!(!exercise.performed_at.is_empty());
        assert_eq!(exercise.duration_minutes, 30.0);
    }

    #[test]
    fn test_list_by_date_range() {
        let conn = test_conn();
        let d1 = DayRecord::create(&conn, "2025-02-15").unwrap();
        let d2 = DayRecord::create(&conn, "2025-02-16").unwrap();
        log(&conn, d1.id, "rowing", 20.0, 150.0);
        log(&conn, d2.id, "treadmill", 30.0, 180.0);

        let all = Exercise::list_by_date_range(&conn, None, None).unwrap();
        assert_eq!(all.len(), 2);

        let only_later =
            Exercise::list_by_date_range(&conn, Some("2025-02-16"), None).unwrap();
        assert_eq!(only_later.len(), 1);
        assert_eq!(only_later[0].name, "treadmill");
    }

    #[test]
    fn test_update_and_delete() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();
        let exercise = log(&conn, day.id, "treadmill", 30.0, 180.0);

        let updated = Exercise::update(
            &conn,
            exercise.id,
            &ExerciseUpdate {
                duration_minutes: Some(45.0),
                ..ExerciseUpdate::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.duration_minutes, 45.0);
        assert_eq!(updated.calories_burned, 180.0);

        assert!(Exercise::delete(&conn, exercise.id).unwrap());
        assert!(Exercise::get_by_id(&conn, exercise.id).unwrap().is_none());
    }

    #[test]
    fn test_day_delete_cascades_to_exercises() {
        let conn = test_conn();
        let day = DayRecord::create(&conn, "2025-02-16").unwrap();
        let exercise = log(&conn, day.id, "treadmill", 30.0, 180.0);

        DayRecord::delete(&conn, day.id).unwrap();
        assert!(Exercise::get_by_id(&conn, exercise.id).unwrap().is_none());
    }
}
