use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{PaymentSourceKind, SubscriptionStatus};

/// Placeholder used when a source has no customer name for a record.
pub const UNKNOWN_CUSTOMER_NAME: &str = "Nome não disponível";

/// A confirmed charge normalized from any payment source.
///
/// Rebuilt on every request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_document: String,
    pub value: Decimal,
    pub last_payment_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub billing_type: String,
    pub source: PaymentSourceKind,
    pub description: Option<String>,
    pub created_at: Option<NaiveDate>,
}

impl Payment {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Ativo
    }
}
