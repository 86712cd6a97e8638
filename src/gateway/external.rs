use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::{GatewayError, PaymentSource};
use crate::billing::classify_subscription;
use crate::db::SubscriptionRepo;
use crate::models::{DateRange, Payment, PaymentSourceKind, Subscription, UNKNOWN_CUSTOMER_NAME};

/// Manual subscriptions paid outside the gateway, read from `subscriptions`.
pub struct ExternalSubscriptionSource {
    pool: PgPool,
}

impl ExternalSubscriptionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentSource for ExternalSubscriptionSource {
    fn kind(&self) -> PaymentSourceKind {
        PaymentSourceKind::External
    }

    async fn fetch_payments(
        &self,
        period: Option<DateRange>,
        today: NaiveDate,
    ) -> Result<Vec<Payment>, GatewayError> {
        let subscriptions = SubscriptionRepo::list_active_external(&self.pool, period)
            .await
            .map_err(|e| GatewayError::Store {
                source_name: PaymentSourceKind::External.to_string(),
                message: e.to_string(),
            })?;

        Ok(subscriptions
            .into_iter()
            .map(|s| subscription_to_payment(s, today))
            .collect())
    }
}

pub fn subscription_to_payment(subscription: Subscription, today: NaiveDate) -> Payment {
    let classification = classify_subscription(subscription.current_period_start, today);

    Payment {
        id: subscription.id.to_string(),
        customer_id: None,
        customer_name: subscription
            .customer_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CUSTOMER_NAME.to_string()),
        customer_email: subscription.customer_email.unwrap_or_default(),
        customer_document: subscription.customer_document.unwrap_or_default(),
        value: subscription.price.max(rust_decimal::Decimal::ZERO),
        last_payment_date: subscription.current_period_start,
        next_due_date: classification.next_due_date,
        status: classification.status,
        billing_type: subscription.payment_method,
        source: PaymentSourceKind::External,
        description: subscription.plan_name,
        created_at: Some(subscription.created_at.date_naive()),
    }
}
