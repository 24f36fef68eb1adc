//! Food item MCP tools
//!
//! Every mutation here recomputes the owning day's totals before returning,
//! so a response never shows a stale total.

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    parse_or_zero, DayRecord, FoodItem, FoodItemCreate, FoodItemUpdate, MacroTotals,
};
use super::days::{format_totals, refresh_day_totals, validate_date};

/// Raw numeric fields as they arrive from the caller. Anything that does not
/// parse as a non-negative number counts as 0.
#[derive(Debug, Default)]
pub struct MacroFields {
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub carbs: Option<String>,
    pub fats: Option<String>,
}

impl MacroFields {
    fn parse(&self) -> MacroTotals {
        MacroTotals {
            calories: parse_or_zero(self.calories.as_deref()),
            protein: parse_or_zero(self.protein.as_deref()),
            carbs: parse_or_zero(self.carbs.as_deref()),
            fats: parse_or_zero(self.fats.as_deref()),
        }
    }
}

/// Response for add_food_item
#[derive(Debug, Serialize)]
pub struct AddFoodItemResponse {
    pub id: i64,
    pub day_id: i64,
    pub date: String,
    pub name: String,
    pub macros: MacroTotals,
    pub day_totals: MacroTotals,
    pub day_display: String,
}

/// Full food item detail with the owning day's date
#[derive(Debug, Serialize)]
pub struct FoodItemDetail {
    pub id: i64,
    pub day_id: i64,
    pub date: String,
    pub name: String,
    pub macros: MacroTotals,
    pub created_at: String,
}

/// Response for update_food_item
#[derive(Debug, Serialize)]
pub struct UpdateFoodItemResponse {
    pub id: i64,
    pub name: String,
    pub macros: MacroTotals,
    pub day_totals: MacroTotals,
    pub day_display: String,
    pub updated_at: String,
}

/// Response for delete_food_item
#[derive(Debug, Serialize)]
pub struct DeleteFoodItemResponse {
    pub deleted: bool,
    pub day_id: i64,
    pub day_totals: MacroTotals,
    pub day_display: String,
}

/// Add a food item to a day, creating the day if needed. The day's totals are
/// recomputed before the response is built.
pub fn add_food_item(
    db: &Database,
    date: &str,
    name: &str,
    fields: MacroFields,
) -> Result<AddFoodItemResponse, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = DayRecord::get_or_create(&conn, date)
        .map_err(|e| format!("Failed to get/create day: {}", e))?;

    let item = FoodItem::create(
        &conn,
        &FoodItemCreate {
            day_id: day.id,
            name: name.to_string(),
            macros: fields.parse(),
        },
    )
    .map_err(|e| format!("Failed to add food item: {}", e))?;

    let day_totals = refresh_day_totals(&conn, day.id)?;
    let day_display = format_totals(&day_totals);

    Ok(AddFoodItemResponse {
        id: item.id,
        day_id: day.id,
        date: day.date,
        name: item.name,
        macros: item.macros,
        day_totals,
        day_display,
    })
}

/// Get a food item by ID
pub fn get_food_item(db: &Database, id: i64) -> Result<Option<FoodItemDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = FoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food item: {}", e))?;

    match item {
        Some(item) => {
            let day = DayRecord::get_by_id(&conn, item.day_id)
                .map_err(|e| format!("Failed to get day: {}", e))?
                .ok_or_else(|| format!("Day not found for food item: {}", item.id))?;

            Ok(Some(FoodItemDetail {
                id: item.id,
                day_id: item.day_id,
                date: day.date,
                name: item.name,
                macros: item.macros,
                created_at: item.created_at,
            }))
        }
        None => Ok(None),
    }
}

/// Update a food item. Edits to numeric fields recompute the day's totals
/// eagerly, matching the live-totals behavior of the views.
pub fn update_food_item(
    db: &Database,
    id: i64,
    name: Option<String>,
    fields: MacroFields,
) -> Result<Option<UpdateFoodItemResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = FoodItemUpdate {
        name,
        calories: fields
            .calories
            .as_deref()
            .map(|s| parse_or_zero(Some(s))),
        protein: fields.protein.as_deref().map(|s| parse_or_zero(Some(s))),
        carbs: fields.carbs.as_deref().map(|s| parse_or_zero(Some(s))),
        fats: fields.fats.as_deref().map(|s| parse_or_zero(Some(s))),
    };

    let updated = FoodItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update food item: {}", e))?;

    match updated {
        Some(item) => {
            let day_totals = refresh_day_totals(&conn, item.day_id)?;
            let day_display = format_totals(&day_totals);

            Ok(Some(UpdateFoodItemResponse {
                id: item.id,
                name: item.name,
                macros: item.macros,
                day_totals,
                day_display,
                updated_at: item.updated_at,
            }))
        }
        None => Ok(None),
    }
}

/// Delete a food item and recompute the owning day's totals
pub fn delete_food_item(db: &Database, id: i64) -> Result<Option<DeleteFoodItemResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day_id = FoodItem::delete(&conn, id)
        .map_err(|e| format!("Failed to delete food item: {}", e))?;

    match day_id {
        Some(day_id) => {
            let day_totals = refresh_day_totals(&conn, day_id)?;
            let day_display = format_totals(&day_totals);

            Ok(Some(DeleteFoodItemResponse {
                deleted: true,
                day_id,
                day_totals,
                day_display,
            }))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(calories: &str, protein: &str, carbs: &str, fats: &str) -> MacroFields {
        MacroFields {
            calories: Some(calories.to_string()),
            protein: Some(protein.to_string()),
            carbs: Some(carbs.to_string()),
            fats: Some(fats.to_string()),
        }
    }

    #[test]
    fn test_add_food_item_updates_day_totals() {
        let db = Database::open_in_memory().unwrap();

        let first =
            add_food_item(&db, "2025-02-16", "oatmeal", fields("100", "5", "10", "2")).unwrap();
        assert_eq!(first.day_totals.calories, 100.0);

        let second =
            add_food_item(&db, "2025-02-16", "chicken", fields("200", "10", "20", "5")).unwrap();
        assert_eq!(second.day_totals.calories, 300.0);
        assert_eq!(second.day_totals.protein, 15.0);
        assert_eq!(second.day_totals.carbs, 30.0);
        assert_eq!(second.day_totals.fats, 7.0);
        assert_eq!(
            second.day_display,
            "300 kcal | protein 15g, carbs 30g, fats 7g"
        );
    }

    #[test]
    fn test_empty_calorie_string_contributes_zero() {
        let db = Database::open_in_memory().unwrap();

        add_food_item(&db, "2025-02-16", "oatmeal", fields("100", "5", "10", "2")).unwrap();
        let response = add_food_item(
            &db,
            "2025-02-16",
            "mystery snack",
            MacroFields {
                calories: Some(String::new()),
                ..MacroFields::default()
            },
        )
        .unwrap();

        assert_eq!(response.macros, MacroTotals::zero());
        assert_eq!(response.day_totals.calories, 100.0);
    }

    #[test]
    fn test_unparsable_fields_contribute_zero() {
        let db = Database::open_in_memory().unwrap();

        let response = add_food_item(
            &db,
            "2025-02-16",
            "guesswork",
            fields("lots", "5", "n/a", "2"),
        )
        .unwrap();

        assert_eq!(response.macros.calories, 0.0);
        assert_eq!(response.macros.protein, 5.0);
        assert_eq!(response.macros.carbs, 0.0);
        assert_eq!(response.macros.fats, 2.0);
    }

    #[test]
    fn test_update_recomputes_eagerly() {
        let db = Database::open_in_memory().unwrap();

        let added =
            add_food_item(&db, "2025-02-16", "oatmeal", fields("100", "5", "10", "2")).unwrap();

        let updated = update_food_item(
            &db,
            added.id,
            None,
            MacroFields {
                calories: Some("150".to_string()),
                ..MacroFields::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.macros.calories, 150.0);
        assert_eq!(updated.day_totals.calories, 150.0);
        // Untouched fields keep their values
        assert_eq!(updated.day_totals.protein, 5.0);
    }

    #[test]
    fn test_delete_recomputes_to_remaining_item() {
        let db = Database::open_in_memory().unwrap();

        let first =
            add_food_item(&db, "2025-02-16", "oatmeal", fields("100", "5", "10", "2")).unwrap();
        add_food_item(&db, "2025-02-16", "chicken", fields("200", "10", "20", "5")).unwrap();

        let deleted = delete_food_item(&db, first.id).unwrap().unwrap();
        assert!(deleted.deleted);
        assert_eq!(
            deleted.day_totals,
            MacroTotals {
                calories: 200.0,
                protein: 10.0,
                carbs: 20.0,
                fats: 5.0,
            }
        );
    }

    #[test]
    fn test_update_missing_item() {
        let db = Database::open_in_memory().unwrap();
        let result = update_food_item(&db, 42, None, MacroFields::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_missing_item() {
        let db = Database::open_in_memory().unwrap();
        assert!(delete_food_item(&db, 42).unwrap().is_none());
    }
}
