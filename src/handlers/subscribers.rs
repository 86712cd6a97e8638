use std::collections::BTreeMap;

use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::billing::{matches_filter, merge_sources, FilterCounts, FilterKind};
use crate::errors::AppError;
use crate::handlers::extract::ApiQuery;
use crate::handlers::AppState;
use crate::models::{ApiResponse, Payment, PaymentSourceKind};

#[derive(Debug, Deserialize)]
pub struct SubscriberQueryParams {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriberList {
    pub filter: FilterKind,
    pub subscribers: Vec<Payment>,
    pub counts: FilterCounts,
    pub errors: BTreeMap<PaymentSourceKind, String>,
}

/// `GET /api/subscribers?filter=`: deduplicated active subscribers across all sources.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SubscriberQueryParams>,
) -> Result<Json<ApiResponse<SubscriberList>>, AppError> {
    let raw_filter = params.filter.unwrap_or_default();
    let filter = FilterKind::parse(&raw_filter)
        .ok_or_else(|| AppError::bad_request(format!("Unknown filter '{raw_filter}'")))?;

    let today = Utc::now().date_naive();
    let outcomes = state.sources.collect(None, today).await?;
    let merged = merge_sources(&outcomes);

    let counts = FilterCounts::tally(&merged.active, today);
    let subscribers = merged
        .active
        .into_iter()
        .filter(|p| matches_filter(p, filter, today))
        .collect();

    Ok(Json(ApiResponse::ok(SubscriberList {
        filter,
        subscribers,
        counts,
        errors: merged.errors,
    })))
}
