use axum::{
    extract::State,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde_json::json;

use crate::auth::{authorize_finance_mutation, Claims};
use crate::db::ExternalRevenueRepo;
use crate::errors::AppError;
use crate::handlers::extract::{ApiJson, ApiQuery};
use crate::handlers::AppState;
use crate::models::{
    max_money_amount, ApiResponse, CreateExternalRevenueRequest, ExternalRevenue, ExternalRevenueList, ExternalRevenueQueryParams,
    MonthPeriod, NewExternalRevenue,
};

fn parse_mes(raw: Option<&str>) -> Result<MonthPeriod, AppError> {
    let raw = raw.ok_or_else(|| AppError::bad_request("mes is required (YYYY-MM)"))?;
    MonthPeriod::parse_reference(raw.trim())
        .ok_or_else(|| AppError::bad_request(format!("Invalid mes '{raw}', expected YYYY-MM")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `GET /api/dashboard/faturamento-assinatura?mes&unidade`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ExternalRevenueQueryParams>,
) -> Result<Json<ApiResponse<ExternalRevenueList>>, AppError> {
    let period = parse_mes(params.mes.as_deref())?;
    let mes = period.reference();
    let unidade = non_empty(params.unidade);

    let items = ExternalRevenueRepo::list(&state.pool, &mes, unidade.as_deref()).await?;
    let total = ExternalRevenueRepo::total(&state.pool, &mes, unidade.as_deref()).await?;

    Ok(Json(ApiResponse::ok(ExternalRevenueList {
        mes_referencia: mes,
        unidade,
        items,
        total,
    })))
}

pub fn validate_external_revenue(req: CreateExternalRevenueRequest) -> Result<NewExternalRevenue, AppError> {
    let period = parse_mes(req.mes_referencia.as_deref())?;
    let unidade = non_empty(req.unidade).ok_or_else(|| AppError::bad_request("unidade is required"))?;
    let cliente_nome = non_empty(req.cliente_nome).ok_or_else(|| AppError::bad_request("clienteNome is required"))?;
    let valor = req.valor.ok_or_else(|| AppError::bad_request("valor is required"))?;

    let valor = valor.round_dp(2);
    if valor < Decimal::ZERO {
        return Err(AppError::bad_request("valor must not be negative"));
    }
    if valor > max_money_amount() {
        return Err(AppError::bad_request(format!("valor must not exceed {}", max_money_amount())));
    }

    Ok(NewExternalRevenue {
        mes_referencia: period.reference(),
        unidade,
        cliente_nome,
        valor,
        forma_pagamento: non_empty(req.forma_pagamento),
        descricao: non_empty(req.descricao),
    })
}

/// `POST /api/dashboard/faturamento-assinatura`
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateExternalRevenueRequest>,
) -> Result<Json<ApiResponse<ExternalRevenue>>, AppError> {
    authorize_finance_mutation(&claims, state.environment)?;
    let item = validate_external_revenue(req)?;

    let saved = ExternalRevenueRepo::create(&state.pool, &item, Some(claims.email.as_str())).await?;
    Ok(Json(ApiResponse::ok(saved)))
}

/// `DELETE /api/dashboard/faturamento-assinatura?id`
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(params): ApiQuery<ExternalRevenueQueryParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize_finance_mutation(&claims, state.environment)?;
    let id = params.id.ok_or_else(|| AppError::bad_request("id is required"))?;

    let deleted = ExternalRevenueRepo::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(AppError::not_found("Revenue entry", &id.to_string()));
    }

    Ok(Json(json!({ "success": true, "data": { "message": "Revenue entry deleted" } })))
}
