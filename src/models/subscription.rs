use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Manually managed subscriber whose payments happen outside the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_document: Option<String>,
    pub plan_name: Option<String>,
    pub price: Decimal,
    pub status: String,
    pub payment_method: String,
    pub current_period_start: NaiveDate,
    pub current_period_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
