use sqlx::PgPool;

use crate::models::{DateRange, Subscription};

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Active subscriptions not billed through the gateway, optionally limited
    /// to those whose current period starts inside `period`.
    pub async fn list_active_external(
        pool: &PgPool,
        period: Option<DateRange>,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        match period {
            Some(range) => {
                sqlx::query_as::<_, Subscription>(
                    r#"SELECT * FROM subscriptions
                       WHERE status = 'ATIVO' AND payment_method <> 'ASAAS'
                         AND current_period_start >= $1 AND current_period_start <= $2
                       ORDER BY current_period_start, created_at"#,
                )
                .bind(range.start)
                .bind(range.end)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Subscription>(
                    r#"SELECT * FROM subscriptions
                       WHERE status = 'ATIVO' AND payment_method <> 'ASAAS'
                       ORDER BY current_period_start, created_at"#,
                )
                .fetch_all(pool)
                .await
            }
        }
    }
}
