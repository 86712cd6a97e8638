pub mod external_revenue;
pub mod goals;
pub mod subscriptions;

pub use external_revenue::ExternalRevenueRepo;
pub use goals::GoalRepo;
pub use subscriptions::SubscriptionRepo;

/// Database-backed tests run only when `DATABASE_URL` points at a scratch Postgres.
#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::postgres::PgPoolOptions;
    use sqlx::PgPool;
    use tokio::sync::Mutex;

    static SCHEMA_APPLIED: Mutex<bool> = Mutex::const_new(false);

    pub async fn pool() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("DATABASE_URL is set but not reachable");

        let mut applied = SCHEMA_APPLIED.lock().await;
        if !*applied {
            sqlx::raw_sql(include_str!("../../migrations/001_initial_schema.sql"))
                .execute(&pool)
                .await
                .expect("apply schema");
            *applied = true;
        }
        Some(pool)
    }
}
