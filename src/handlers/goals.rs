use axum::{
    extract::State,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde_json::json;

use crate::auth::{authorize_finance_mutation, Claims};
use crate::db::GoalRepo;
use crate::errors::AppError;
use crate::handlers::extract::{ApiJson, ApiQuery};
use crate::handlers::AppState;
use crate::models::{
    default_goal_description, max_money_amount, ApiResponse, GoalQueryParams, GoalUpsert, MonthPeriod, MonthlyGoal, UpsertGoalRequest,
};

/// `GET /api/dashboard/metas?year[&month]`: one goal when `month` is given, else the list.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<GoalQueryParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    match (params.year, params.month) {
        (Some(year), Some(month)) => {
            MonthPeriod::new(year, month)
                .ok_or_else(|| AppError::bad_request(format!("Invalid period {month}/{year}")))?;
            let goal = GoalRepo::get(&state.pool, year, month).await?;
            Ok(Json(json!({ "success": true, "data": goal })))
        }
        (None, Some(_)) => Err(AppError::bad_request("year is required when month is given")),
        (year, None) => {
            let goals = GoalRepo::list(&state.pool, year).await?;
            Ok(Json(json!({ "success": true, "data": goals })))
        }
    }
}

pub fn validate_goal(req: UpsertGoalRequest) -> Result<GoalUpsert, AppError> {
    let year = req.year.ok_or_else(|| AppError::bad_request("year is required"))?;
    let month = req.month.ok_or_else(|| AppError::bad_request("month is required"))?;
    let goal_amount = req
        .goal_amount
        .ok_or_else(|| AppError::bad_request("goalAmount is required"))?;

    MonthPeriod::new(year, month)
        .ok_or_else(|| AppError::bad_request(format!("Invalid period {month}/{year}")))?;

    let goal_amount = goal_amount.round_dp(2);
    if goal_amount < Decimal::ZERO {
        return Err(AppError::bad_request("goalAmount must not be negative"));
    }
    if goal_amount > max_money_amount() {
        return Err(AppError::bad_request(format!("goalAmount must not exceed {}", max_money_amount())));
    }

    let description = req
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| default_goal_description(year, month));

    Ok(GoalUpsert {
        year,
        month,
        goal_amount,
        description,
    })
}

/// `POST /api/dashboard/metas`: create or replace the goal for `(year, month)`.
pub async fn upsert(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpsertGoalRequest>,
) -> Result<Json<ApiResponse<MonthlyGoal>>, AppError> {
    authorize_finance_mutation(&claims, state.environment)?;
    let goal = validate_goal(req)?;

    let saved = GoalRepo::upsert(&state.pool, &goal, Some(claims.email.as_str())).await?;
    tracing::info!(year = saved.year, month = saved.month, amount = %saved.goal_amount, "Monthly goal saved");
    Ok(Json(ApiResponse::ok(saved)))
}

/// `DELETE /api/dashboard/metas?year&month`
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(params): ApiQuery<GoalQueryParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize_finance_mutation(&claims, state.environment)?;

    let year = params.year.ok_or_else(|| AppError::bad_request("year is required"))?;
    let month = params.month.ok_or_else(|| AppError::bad_request("month is required"))?;

    let deleted = GoalRepo::delete(&state.pool, year, month).await?;
    if deleted == 0 {
        return Err(AppError::not_found("Goal", &format!("{year}-{month:02}")));
    }

    Ok(Json(json!({ "success": true, "data": { "message": "Goal deleted" } })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(year: Option<i32>, month: Option<u32>, amount: Option<Decimal>) -> UpsertGoalRequest {
        UpsertGoalRequest {
            year,
            month,
            goal_amount: amount,
            description: None,
        }
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(validate_goal(request(None, Some(3), Some(Decimal::from(1)))).is_err());
        assert!(validate_goal(request(Some(2025), None, Some(Decimal::from(1)))).is_err());

        let err = validate_goal(request(Some(2025), Some(3), None)).unwrap_err();
        assert_eq!(err.body.error, "goalAmount is required");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(validate_goal(request(Some(2025), Some(13), Some(Decimal::from(1)))).is_err());
        assert!(validate_goal(request(Some(2025), Some(3), Some(Decimal::from(-5)))).is_err());

        let err = validate_goal(request(Some(2025), Some(3), Some(Decimal::from(10_000_000_000i64)))).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(validate_goal(request(Some(2025), Some(3), Some(max_money_amount()))).is_ok());
    }

    #[test]
    fn test_description_defaults_to_period() {
        let goal = validate_goal(request(Some(2025), Some(3), Some(Decimal::new(1500055, 2)))).unwrap();
        assert_eq!(goal.description, "Meta 3/2025");
        assert_eq!(goal.goal_amount, Decimal::new(1500055, 2));

        let mut req = request(Some(2025), Some(4), Some(Decimal::from(100)));
        req.description = Some("  Meta de abril  ".into());
        assert_eq!(validate_goal(req).unwrap().description, "Meta de abril");
    }
}
