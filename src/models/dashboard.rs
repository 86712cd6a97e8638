use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBySource {
    pub asaas_trato: Decimal,
    pub asaas_andrey: Decimal,
    pub external: Decimal,
    pub total: Decimal,
}

impl RevenueBySource {
    pub fn new(asaas_trato: Decimal, asaas_andrey: Decimal, external: Decimal) -> Self {
        Self {
            asaas_trato,
            asaas_andrey,
            external,
            total: asaas_trato + asaas_andrey + external,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceState {
    Ok,
    Failed,
    NotConfigured,
}

/// Whether a source's number can be trusted, so zero revenue and an
/// unavailable source are distinguishable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub status: SourceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub payments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourcesHealth {
    pub asaas_trato: SourceHealth,
    pub asaas_andrey: SourceHealth,
    pub external: SourceHealth,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalSnapshot {
    pub amount: Decimal,
    pub description: String,
    pub percentage: f64,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub month: u32,
    pub year: i32,
    pub revenue: RevenueBySource,
    pub sources: SourcesHealth,
    pub overdue_count: usize,
    pub active_subscribers: usize,
    pub goal: GoalSnapshot,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthRevenue {
    pub month: u32,
    pub revenue: RevenueBySource,
    pub goal_amount: Decimal,
    pub overdue_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTimeline {
    pub year: i32,
    pub months: Vec<MonthRevenue>,
    pub total_revenue: Decimal,
    pub goal_total: Decimal,
    pub average_monthly_revenue: Decimal,
    pub best_month: Option<MonthRevenue>,
    pub worst_month: Option<MonthRevenue>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQueryParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineQueryParams {
    pub year: Option<i32>,
}
