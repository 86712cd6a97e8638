use axum::{
    extract::State,
    Json,
};
use chrono::{Datelike, Utc};

use crate::dashboard::monthly_dashboard;
use crate::errors::AppError;
use crate::handlers::extract::ApiQuery;
use crate::handlers::AppState;
use crate::models::{ApiResponse, DashboardData, MonthPeriod, MonthlyQueryParams, RevenueTimeline, TimelineQueryParams};

/// `GET /api/dashboard/faturamento-mensal?year&month`, defaulting to the current month.
pub async fn faturamento_mensal(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MonthlyQueryParams>,
) -> Result<Json<ApiResponse<DashboardData>>, AppError> {
    let today = Utc::now().date_naive();
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());

    let period = MonthPeriod::new(year, month)
        .ok_or_else(|| AppError::bad_request(format!("Invalid period {month}/{year}")))?;

    let data = monthly_dashboard(&state.pool, &state.sources, period, today).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// `GET /api/dashboard/revenue-timeline?year`, defaulting to the current year.
pub async fn revenue_timeline(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TimelineQueryParams>,
) -> Result<Json<ApiResponse<RevenueTimeline>>, AppError> {
    let today = Utc::now().date_naive();
    let year = params.year.unwrap_or_else(|| today.year());

    if MonthPeriod::new(year, 1).is_none() {
        return Err(AppError::bad_request(format!("Invalid year {year}")));
    }

    let timeline = crate::dashboard::revenue_timeline(&state.pool, &state.sources, year, today).await?;
    Ok(Json(ApiResponse::ok(timeline)))
}
