use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::extract::ApiQuery;
use crate::handlers::AppState;
use crate::models::{DateRange, MonthPeriod, Payment};

#[derive(Debug, Deserialize)]
pub struct AccountPaymentsQueryParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPaymentsResponse {
    pub success: bool,
    pub account: String,
    pub total: usize,
    pub total_confirmed: usize,
    pub payments: Vec<Payment>,
}

/// `year` + `month` selects one month, `year` alone the whole year, neither the full history.
pub fn requested_range(year: Option<i32>, month: Option<u32>) -> Result<Option<DateRange>, AppError> {
    match (year, month) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(AppError::bad_request("year is required when month is given")),
        (Some(year), None) => DateRange::year(year)
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("Invalid year {year}"))),
        (Some(year), Some(month)) => MonthPeriod::new(year, month)
            .map(|p| Some(p.range()))
            .ok_or_else(|| AppError::bad_request(format!("Invalid period {month}/{year}"))),
    }
}

/// `GET /api/asaas/:account/payments?year&month`
pub async fn account_payments(
    State(state): State<AppState>,
    Path(account_name): Path<String>,
    ApiQuery(params): ApiQuery<AccountPaymentsQueryParams>,
) -> Result<Json<AccountPaymentsResponse>, AppError> {
    let account = state
        .accounts
        .get(&account_name.to_lowercase())
        .ok_or_else(|| AppError::not_found("Gateway account", &account_name))?;
    let period = requested_range(params.year, params.month)?;

    let today = Utc::now().date_naive();
    let listing = account.fetch_listing(period, today).await?;

    Ok(Json(AccountPaymentsResponse {
        success: true,
        account: account.name().to_string(),
        total: listing.total,
        total_confirmed: listing.payments.len(),
        payments: listing.payments,
    }))
}
