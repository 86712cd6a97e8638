use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ExternalRevenue, NewExternalRevenue};

pub struct ExternalRevenueRepo;

impl ExternalRevenueRepo {
    pub async fn list(
        pool: &PgPool,
        mes_referencia: &str,
        unidade: Option<&str>,
    ) -> Result<Vec<ExternalRevenue>, sqlx::Error> {
        let mut sql = String::from("SELECT * FROM faturamento_assinatura WHERE mes_referencia = $1");
        if unidade.is_some() {
            sql.push_str(" AND unidade = $2");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, ExternalRevenue>(&sql).bind(mes_referencia);
        if let Some(u) = unidade {
            query = query.bind(u);
        }
        query.fetch_all(pool).await
    }

    pub async fn total(pool: &PgPool, mes_referencia: &str, unidade: Option<&str>) -> Result<Decimal, sqlx::Error> {
        let row: (Option<Decimal>,) = sqlx::query_as(
            "SELECT SUM(valor) FROM faturamento_assinatura WHERE mes_referencia = $1 AND ($2::text IS NULL OR unidade = $2)"
        )
        .bind(mes_referencia)
        .bind(unidade)
        .fetch_one(pool)
        .await?;
        Ok(row.0.unwrap_or(Decimal::ZERO))
    }

    pub async fn create(
        pool: &PgPool,
        item: &NewExternalRevenue,
        created_by: Option<&str>,
    ) -> Result<ExternalRevenue, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, ExternalRevenue>(
            r#"INSERT INTO faturamento_assinatura (id, mes_referencia, unidade, cliente_nome, valor, forma_pagamento, descricao, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&item.mes_referencia)
        .bind(&item.unidade)
        .bind(&item.cliente_nome)
        .bind(item.valor)
        .bind(&item.forma_pagamento)
        .bind(&item.descricao)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM faturamento_assinatura WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
