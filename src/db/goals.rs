use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{GoalUpsert, MonthlyGoal};

pub struct GoalRepo;

impl GoalRepo {
    pub async fn get(pool: &PgPool, year: i32, month: u32) -> Result<Option<MonthlyGoal>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyGoal>(
            "SELECT * FROM monthly_goals WHERE year = $1 AND month = $2"
        )
        .bind(year)
        .bind(month as i32)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool, year: Option<i32>) -> Result<Vec<MonthlyGoal>, sqlx::Error> {
        match year {
            Some(year) => {
                sqlx::query_as::<_, MonthlyGoal>(
                    "SELECT * FROM monthly_goals WHERE year = $1 ORDER BY month"
                )
                .bind(year)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, MonthlyGoal>(
                    "SELECT * FROM monthly_goals ORDER BY year DESC, month DESC"
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Whole-row upsert keyed on `(year, month)`; concurrent writers rely on
    /// the database's conflict handling.
    pub async fn upsert(pool: &PgPool, goal: &GoalUpsert, created_by: Option<&str>) -> Result<MonthlyGoal, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, MonthlyGoal>(
            r#"INSERT INTO monthly_goals (id, year, month, goal_amount, description, created_by)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (year, month)
               DO UPDATE SET goal_amount = EXCLUDED.goal_amount, description = EXCLUDED.description,
                             created_by = EXCLUDED.created_by, updated_at = NOW()
               RETURNING *"#,
        )
        .bind(id)
        .bind(goal.year)
        .bind(goal.month as i32)
        .bind(goal.goal_amount)
        .bind(&goal.description)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, year: i32, month: u32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM monthly_goals WHERE year = $1 AND month = $2")
            .bind(year)
            .bind(month as i32)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
