//! fitlog MCP server implementation
//!
//! Exposes the day, food item, exercise, and statistics tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::tools::days;
use crate::tools::exercises;
use crate::tools::food_items;
use crate::tools::food_items::MacroFields;
use crate::tools::stats;
use crate::tools::status::{StatusTracker, USAGE_INSTRUCTIONS};

/// fitlog MCP service
#[derive(Clone)]
pub struct FitlogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<FitlogService>,
}

impl FitlogService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Day Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDayParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDaysParams {
    /// Start date (inclusive) - optional
    pub start_date: Option<String>,
    /// End date (inclusive) - optional
    pub end_date: Option<String>,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDayParams {
    /// Date in ISO format: YYYY-MM-DD. Deletes the day's food items and exercises too.
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecalculateDayParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
}

// ============================================================================
// Food Item Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodItemParams {
    /// Date in ISO format: YYYY-MM-DD. The day is created if it does not exist.
    pub date: String,
    /// Food name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Calories, as entered (unparsable or missing counts as 0)
    pub calories: Option<String>,
    /// Protein in grams, as entered (unparsable or missing counts as 0)
    pub protein: Option<String>,
    /// Carbs in grams, as entered (unparsable or missing counts as 0)
    pub carbs: Option<String>,
    /// Fats in grams, as entered (unparsable or missing counts as 0)
    pub fats: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodItemParams {
    /// Food item ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodItemParams {
    /// Food item ID
    pub id: i64,
    /// New name (optional)
    pub name: Option<String>,
    /// New calories, as entered (optional; unparsable counts as 0)
    pub calories: Option<String>,
    /// New protein in grams (optional; unparsable counts as 0)
    pub protein: Option<String>,
    /// New carbs in grams (optional; unparsable counts as 0)
    pub carbs: Option<String>,
    /// New fats in grams (optional; unparsable counts as 0)
    pub fats: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFoodItemParams {
    /// Food item ID to delete
    pub id: i64,
}

// ============================================================================
// Exercise Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogExerciseParams {
    /// Date in ISO format: YYYY-MM-DD. The day is created if it does not exist.
    pub date: String,
    /// Exercise name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Duration in minutes, as entered (unparsable or missing counts as 0)
    pub duration_minutes: Option<String>,
    /// Calories burned, as entered (unparsable or missing counts as 0)
    pub calories_burned: Option<String>,
    /// Timestamp the session was performed (defaults to now)
    pub performed_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListExercisesParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateExerciseParams {
    /// Exercise ID
    pub id: i64,
    /// New name (optional)
    pub name: Option<String>,
    /// New duration in minutes (optional; unparsable counts as 0)
    pub duration_minutes: Option<String>,
    /// New calories burned (optional; unparsable counts as 0)
    pub calories_burned: Option<String>,
    /// New performed-at timestamp (optional)
    pub performed_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteExerciseParams {
    /// Exercise ID
    pub id: i64,
}

// ============================================================================
// Statistics Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DayStatsParams {
    /// Start date (inclusive) - optional
    pub start_date: Option<String>,
    /// End date (inclusive) - optional
    pub end_date: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl FitlogService {
    // --- Service ---

    #[tool(description = "Get the current status of the fitlog service including build info, database status, and process information")]
    async fn fitlog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for logging food and exercise. Call this when starting a new logging session or when unsure how to use the tools.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            USAGE_INSTRUCTIONS,
        )]))
    }

    // --- Days ---

    #[tool(description = "Add a day record for a date (or return the existing one). A fresh day starts with all totals at zero.")]
    fn add_day(&self, Parameters(p): Parameters<AddDayParams>) -> Result<CallToolResult, McpError> {
        let result = days::add_day(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a day with its totals, food items (sorted by name), and exercises")]
    fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        let result = days::get_day(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(day) => serde_json::to_string_pretty(&day),
            None => Ok(format!(r#"{{"error": "Day not found", "date": "{}"}}"#, p.date)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List days newest-first with their totals, optionally restricted to a date range")]
    fn list_days(&self, Parameters(p): Parameters<ListDaysParams>) -> Result<CallToolResult, McpError> {
        let result = days::list_days(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.limit,
            p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a day and everything logged under it (food items and exercises)")]
    fn delete_day(&self, Parameters(p): Parameters<DeleteDayParams>) -> Result<CallToolResult, McpError> {
        let deleted = days::delete_day(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "deleted": deleted,
            "date": p.date,
        }))
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Force a full recalculation of a day's cached totals from its food items")]
    fn recalculate_day(&self, Parameters(p): Parameters<RecalculateDayParams>) -> Result<CallToolResult, McpError> {
        let result = days::recalculate_day(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Food Items ---

    #[tool(description = "Log a food item for a date. Numeric fields are free text; unparsable or missing values count as 0. Returns the day's recalculated totals.")]
    fn add_food_item(&self, Parameters(p): Parameters<AddFoodItemParams>) -> Result<CallToolResult, McpError> {
        let fields = MacroFields {
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fats: p.fats,
        };
        let result = food_items::add_food_item(&self.database, &p.date, &p.name, fields)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a food item by ID")]
    fn get_food_item(&self, Parameters(p): Parameters<GetFoodItemParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::get_food_item(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(item) => serde_json::to_string_pretty(&item),
            None => Ok(format!(r#"{{"error": "Food item not found", "id": {}}}"#, p.id)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a food item. The owning day's totals are recalculated immediately and returned.")]
    fn update_food_item(&self, Parameters(p): Parameters<UpdateFoodItemParams>) -> Result<CallToolResult, McpError> {
        let fields = MacroFields {
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fats: p.fats,
        };
        let result = food_items::update_food_item(&self.database, p.id, p.name, fields)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(resp) => serde_json::to_string_pretty(&resp),
            None => Ok(format!(r#"{{"error": "Food item not found", "id": {}}}"#, p.id)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a food item. The owning day's totals are recalculated and returned.")]
    fn delete_food_item(&self, Parameters(p): Parameters<DeleteFoodItemParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::delete_food_item(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(resp) => serde_json::to_string_pretty(&resp),
            None => Ok(format!(r#"{{"error": "Food item not found", "id": {}}}"#, p.id)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Exercises ---

    #[tool(description = "Log an exercise session for a date. Numeric fields are free text; unparsable or missing values count as 0.")]
    fn log_exercise(&self, Parameters(p): Parameters<LogExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = exercises::log_exercise(
            &self.database,
            &p.date,
            &p.name,
            p.duration_minutes.as_deref(),
            p.calories_burned.as_deref(),
            p.performed_at,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List a day's exercises with summed minutes and calories burned")]
    fn list_exercises(&self, Parameters(p): Parameters<ListExercisesParams>) -> Result<CallToolResult, McpError> {
        let result = exercises::list_exercises(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(resp) => serde_json::to_string_pretty(&resp),
            None => Ok(format!(r#"{{"error": "Day not found", "date": "{}"}}"#, p.date)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update an exercise session")]
    fn update_exercise(&self, Parameters(p): Parameters<UpdateExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = exercises::update_exercise(
            &self.database,
            p.id,
            p.name,
            p.duration_minutes.as_deref(),
            p.calories_burned.as_deref(),
            p.performed_at,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(exercise) => serde_json::to_string_pretty(&exercise),
            None => Ok(format!(r#"{{"error": "Exercise not found", "id": {}}}"#, p.id)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete an exercise session")]
    fn delete_exercise(&self, Parameters(p): Parameters<DeleteExerciseParams>) -> Result<CallToolResult, McpError> {
        let deleted = exercises::delete_exercise(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "deleted": deleted,
            "id": p.id,
        }))
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Statistics ---

    #[tool(description = "Summarize logged days over an optional date range: intake totals, daily averages, exercise totals, and net calories")]
    fn day_stats(&self, Parameters(p): Parameters<DayStatsParams>) -> Result<CallToolResult, McpError> {
        let result = stats::day_stats(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FitlogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fitlog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("fitlog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "fitlog - daily food intake and exercise tracking. \
                 IMPORTANT: Call usage_instructions when starting a logging session. \
                 Days: add_day/get_day/list_days/delete_day/recalculate_day. \
                 Food: add/get/update/delete_food_item - numeric fields are free text, \
                 unparsable values count as 0, and every mutation returns the day's \
                 recalculated totals. \
                 Exercise: log_exercise/list_exercises/update_exercise/delete_exercise. \
                 Statistics: day_stats for range summaries and net calories."
                    .into(),
            ),
        }
    }
}
