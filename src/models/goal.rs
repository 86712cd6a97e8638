use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyGoal {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub goal_amount: Decimal,
    pub description: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/dashboard/metas`. Fields are optional so that missing
/// values surface as a 400 instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertGoalRequest {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub goal_amount: Option<Decimal>,
    pub description: Option<String>,
}

/// Validated goal ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalUpsert {
    pub year: i32,
    pub month: u32,
    pub goal_amount: Decimal,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalQueryParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub fn default_goal_description(year: i32, month: u32) -> String {
    format!("Meta {month}/{year}")
}
