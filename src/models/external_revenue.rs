use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Manually entered subscription revenue for a unit and month (`faturamento_assinatura`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRevenue {
    pub id: Uuid,
    pub mes_referencia: String,
    pub unidade: String,
    pub cliente_nome: String,
    pub valor: Decimal,
    pub forma_pagamento: Option<String>,
    pub descricao: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExternalRevenueRequest {
    pub mes_referencia: Option<String>,
    pub unidade: Option<String>,
    pub cliente_nome: Option<String>,
    pub valor: Option<Decimal>,
    pub forma_pagamento: Option<String>,
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExternalRevenue {
    pub mes_referencia: String,
    pub unidade: String,
    pub cliente_nome: String,
    pub valor: Decimal,
    pub forma_pagamento: Option<String>,
    pub descricao: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExternalRevenueQueryParams {
    pub mes: Option<String>,
    pub unidade: Option<String>,
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRevenueList {
    pub mes_referencia: String,
    pub unidade: Option<String>,
    pub items: Vec<ExternalRevenue>,
    pub total: Decimal,
}
