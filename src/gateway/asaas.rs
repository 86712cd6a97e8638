//! Asaas gateway adapter.
//!
//! One `AsaasAccount` per credentialed account. Confirmed payments are listed
//! page by page, then customer profiles are looked up concurrently. A failed
//! profile lookup only degrades that record's name and email.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{GatewayError, PaymentSource};
use crate::billing::classify_subscription;
use crate::config::{GatewayAccountConfig, GatewayConfig};
use crate::models::{DateRange, Payment, PaymentSourceKind, UNKNOWN_CUSTOMER_NAME};

const CONFIRMED_STATUS: &str = "CONFIRMED";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentListResponse {
    #[serde(default)]
    data: Vec<AsaasPayment>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsaasPayment {
    pub id: String,
    pub customer: Option<String>,
    #[serde(default)]
    pub value: Decimal,
    pub billing_type: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub payment_date: Option<String>,
    pub confirmed_date: Option<String>,
    pub client_payment_date: Option<String>,
    pub date_created: Option<String>,
    /// Customer name and email cached on the charge itself.
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

impl AsaasPayment {
    /// Most reliable settlement date the gateway reports for this charge.
    fn settled_on(&self) -> Option<NaiveDate> {
        [
            &self.confirmed_date,
            &self.payment_date,
            &self.client_payment_date,
            &self.due_date,
        ]
        .into_iter()
        .find_map(|d| d.as_deref().and_then(parse_gateway_date))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsaasCustomer {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub cpf_cnpj: Option<String>,
}

/// Gateway dates come as `YYYY-MM-DD`, sometimes with a time suffix.
fn parse_gateway_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Raw listing from one account plus its normalized payments.
#[derive(Debug, Clone)]
pub struct AccountListing {
    pub total: usize,
    pub payments: Vec<Payment>,
}

pub struct AsaasAccount {
    name: String,
    kind: PaymentSourceKind,
    base_url: String,
    api_key: String,
    page_size: u32,
    client: Client,
}

impl AsaasAccount {
    pub fn new(
        name: impl Into<String>,
        kind: PaymentSourceKind,
        gateway: &GatewayConfig,
        account: &GatewayAccountConfig,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(gateway.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        let base_url = account
            .base_url
            .clone()
            .unwrap_or_else(|| gateway.base_url.clone());

        Self {
            name: name.into(),
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: account.api_key.clone(),
            page_size: gateway.page_size.max(1),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(account = %self.name, path, "Asaas request");

        let response = self
            .client
            .get(&url)
            .header("access_token", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Request {
                account: self.name.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized {
                account: self.name.clone(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                account: self.name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| GatewayError::Decode {
            account: self.name.clone(),
            message: e.to_string(),
        })
    }

    /// All confirmed payments, following `hasMore` pagination.
    pub async fn list_confirmed(&self) -> Result<Vec<AsaasPayment>, GatewayError> {
        let mut payments = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let page: PaymentListResponse = self
                .get_json(
                    "/payments",
                    &[
                        ("status", CONFIRMED_STATUS.to_string()),
                        ("offset", offset.to_string()),
                        ("limit", self.page_size.to_string()),
                    ],
                )
                .await?;

            let received = page.data.len() as u32;
            payments.extend(page.data);

            if !page.has_more || received == 0 {
                break;
            }
            offset += received;
        }

        Ok(payments)
    }

    pub async fn get_customer(&self, customer_id: &str) -> Result<AsaasCustomer, GatewayError> {
        self.get_json(&format!("/customers/{customer_id}"), &[]).await
    }

    /// Looks up every distinct customer concurrently. Failed lookups are
    /// logged and left out of the map.
    async fn lookup_customers(&self, records: &[(AsaasPayment, NaiveDate)]) -> HashMap<String, AsaasCustomer> {
        let ids: HashSet<&str> = records
            .iter()
            .filter_map(|(p, _)| p.customer.as_deref())
            .collect();

        let lookups = ids.into_iter().map(|id| async move { (id, self.get_customer(id).await) });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(customer) => Some((id.to_string(), customer)),
                Err(e) => {
                    warn!(account = %self.name, customer_id = id, error = %e, "Customer lookup failed");
                    None
                }
            })
            .collect()
    }

    pub async fn fetch_listing(
        &self,
        period: Option<DateRange>,
        today: NaiveDate,
    ) -> Result<AccountListing, GatewayError> {
        let raw = self.list_confirmed().await?;
        let total = raw.len();

        let records = select_records(raw, period);
        let customers = self.lookup_customers(&records).await;

        let payments: Vec<Payment> = records
            .into_iter()
            .map(|(record, settled_on)| {
                let customer = record.customer.as_deref().and_then(|id| customers.get(id));
                build_payment(record, settled_on, customer, self.kind, today)
            })
            .collect();

        info!(account = %self.name, total, confirmed = payments.len(), "Fetched gateway payments");
        Ok(AccountListing { total, payments })
    }
}

#[async_trait]
impl PaymentSource for AsaasAccount {
    fn kind(&self) -> PaymentSourceKind {
        self.kind
    }

    async fn fetch_payments(
        &self,
        period: Option<DateRange>,
        today: NaiveDate,
    ) -> Result<Vec<Payment>, GatewayError> {
        Ok(self.fetch_listing(period, today).await?.payments)
    }
}

/// Drops repeated payment ids (first kept), records without any usable date,
/// and records settled outside `period`.
fn select_records(raw: Vec<AsaasPayment>, period: Option<DateRange>) -> Vec<(AsaasPayment, NaiveDate)> {
    let mut seen = HashSet::new();

    raw.into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .filter_map(|p| match p.settled_on() {
            Some(date) => Some((p, date)),
            None => {
                warn!(payment_id = %p.id, "Skipping payment without a settlement date");
                None
            }
        })
        .filter(|(_, date)| period.map_or(true, |range| range.contains(*date)))
        .collect()
}

fn build_payment(
    record: AsaasPayment,
    settled_on: NaiveDate,
    customer: Option<&AsaasCustomer>,
    kind: PaymentSourceKind,
    today: NaiveDate,
) -> Payment {
    let classification = classify_subscription(settled_on, today);

    let customer_name = customer
        .and_then(|c| c.name.clone())
        .filter(|n| !n.trim().is_empty())
        .or_else(|| record.customer_name.clone().filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| UNKNOWN_CUSTOMER_NAME.to_string());
    let customer_email = customer
        .and_then(|c| c.email.clone())
        .filter(|e| !e.trim().is_empty())
        .or_else(|| record.customer_email.clone())
        .unwrap_or_default();
    let customer_document = customer.and_then(|c| c.cpf_cnpj.clone()).unwrap_or_default();

    Payment {
        customer_id: record.customer.clone(),
        created_at: record.date_created.as_deref().and_then(parse_gateway_date),
        id: record.id,
        customer_name,
        customer_email,
        customer_document,
        value: record.value.max(Decimal::ZERO),
        last_payment_date: settled_on,
        next_due_date: classification.next_due_date,
        status: classification.status,
        billing_type: record.billing_type.unwrap_or_default(),
        source: kind,
        description: record.description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthPeriod, SubscriptionStatus};
    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    fn raw(id: &str, customer: Option<&str>, confirmed: &str) -> AsaasPayment {
        AsaasPayment {
            id: id.into(),
            customer: customer.map(Into::into),
            value: Decimal::from(150),
            billing_type: Some("CREDIT_CARD".into()),
            description: Some("Plano Mensal".into()),
            due_date: None,
            payment_date: None,
            confirmed_date: Some(confirmed.into()),
            client_payment_date: None,
            date_created: Some(confirmed.into()),
            customer_name: None,
            customer_email: None,
        }
    }

    #[test]
    fn test_settlement_date_preference() {
        let mut p = raw("pay_1", None, "2025-03-10");
        p.payment_date = Some("2025-03-12".into());
        assert_eq!(p.settled_on(), NaiveDate::from_ymd_opt(2025, 3, 10));

        p.confirmed_date = None;
        assert_eq!(p.settled_on(), NaiveDate::from_ymd_opt(2025, 3, 12));

        p.payment_date = None;
        p.due_date = Some("2025-03-20T00:00:00".into());
        assert_eq!(p.settled_on(), NaiveDate::from_ymd_opt(2025, 3, 20));

        p.due_date = Some("not a date".into());
        assert_eq!(p.settled_on(), None);
    }

    #[test]
    fn test_select_records_dedups_and_filters_period() {
        let march = MonthPeriod::new(2025, 3).unwrap().range();
        let records = select_records(
            vec![
                raw("pay_1", Some("cus_1"), "2025-03-10"),
                raw("pay_1", Some("cus_1"), "2025-03-11"),
                raw("pay_2", Some("cus_2"), "2025-04-01"),
            ],
            Some(march),
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0.id, "pay_1");
        assert_eq!(records[0].1, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn test_build_payment_falls_back_without_customer() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let settled = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let p = build_payment(raw("pay_1", Some("cus_1"), "2025-03-10"), settled, None, PaymentSourceKind::AsaasTrato, today);

        assert_eq!(p.customer_name, UNKNOWN_CUSTOMER_NAME);
        assert_eq!(p.customer_email, "");
        assert_eq!(p.customer_document, "");
        assert_eq!(p.next_due_date, NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
        assert_eq!(p.status, SubscriptionStatus::Ativo);
    }

    #[test]
    fn test_build_payment_uses_cached_customer_fields() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let settled = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut record = raw("pay_1", Some("cus_1"), "2025-03-10");
        record.customer_name = Some("Bruno Lima".into());
        record.customer_email = Some("bruno@x.com".into());

        let p = build_payment(record.clone(), settled, None, PaymentSourceKind::AsaasTrato, today);
        assert_eq!(p.customer_name, "Bruno Lima");
        assert_eq!(p.customer_email, "bruno@x.com");

        let profile = AsaasCustomer {
            id: "cus_1".into(),
            name: Some("Bruno Lima Souza".into()),
            email: None,
            cpf_cnpj: Some("111".into()),
        };
        let p = build_payment(record, settled, Some(&profile), PaymentSourceKind::AsaasTrato, today);
        assert_eq!(p.customer_name, "Bruno Lima Souza");
        assert_eq!(p.customer_email, "bruno@x.com");
        assert_eq!(p.customer_document, "111");
    }

    async fn fake_payments(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
        if headers.get("access_token").and_then(|v| v.to_str().ok()) != Some("good-key") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"errors": []})));
        }
        assert_eq!(q.get("status").map(String::as_str), Some("CONFIRMED"));

        let page = match q.get("offset").map(String::as_str) {
            Some("0") => json!({
                "hasMore": true,
                "data": [
                    {"id": "pay_1", "customer": "cus_ok", "value": 100.5, "billingType": "PIX", "confirmedDate": "2025-03-05", "dateCreated": "2025-03-05"},
                    {"id": "pay_2", "customer": "cus_broken", "value": 80, "billingType": "BOLETO", "paymentDate": "2025-03-07"}
                ]
            }),
            _ => json!({
                "hasMore": false,
                "data": [
                    {"id": "pay_2", "customer": "cus_broken", "value": 80, "billingType": "BOLETO", "paymentDate": "2025-03-07"},
                    {"id": "pay_3", "customer": "cus_ok", "value": 50, "billingType": "PIX", "confirmedDate": "2025-01-02"}
                ]
            }),
        };
        (StatusCode::OK, Json(page))
    }

    async fn fake_customer(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
        if id == "cus_ok" {
            (
                StatusCode::OK,
                Json(json!({"id": "cus_ok", "name": "Ana Souza", "email": "ana@x.com", "cpfCnpj": "12345678900"})),
            )
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"errors": []})))
        }
    }

    async fn spawn_fake_gateway() -> String {
        let app = Router::new()
            .route("/payments", get(fake_payments))
            .route("/customers/:id", get(fake_customer));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn account(base_url: String, api_key: &str) -> AsaasAccount {
        let gateway = GatewayConfig {
            base_url,
            timeout_secs: 5,
            page_size: 2,
            trato: GatewayAccountConfig { api_key: api_key.into(), base_url: None },
            andrey: None,
        };
        AsaasAccount::new("trato", PaymentSourceKind::AsaasTrato, &gateway, &gateway.trato)
    }

    #[tokio::test]
    async fn test_fetch_listing_paginates_and_degrades_failed_lookups() {
        let base = spawn_fake_gateway().await;
        let trato = account(base, "good-key");
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();

        let listing = trato.fetch_listing(None, today).await.unwrap();
        assert_eq!(listing.total, 4);
        assert_eq!(listing.payments.len(), 3);

        let first = &listing.payments[0];
        assert_eq!(first.id, "pay_1");
        assert_eq!(first.customer_name, "Ana Souza");
        assert_eq!(first.customer_email, "ana@x.com");
        assert_eq!(first.customer_document, "12345678900");
        assert_eq!(first.value, Decimal::new(1005, 1));

        let degraded = &listing.payments[1];
        assert_eq!(degraded.id, "pay_2");
        assert_eq!(degraded.customer_name, UNKNOWN_CUSTOMER_NAME);
        assert_eq!(degraded.customer_email, "");

        let old = &listing.payments[2];
        assert_eq!(old.status, SubscriptionStatus::Atrasado);
    }

    #[tokio::test]
    async fn test_fetch_payments_applies_period() {
        let base = spawn_fake_gateway().await;
        let trato = account(base, "good-key");
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let march = MonthPeriod::new(2025, 3).unwrap().range();

        let payments = trato.fetch_payments(Some(march), today).await.unwrap();
        let ids: Vec<&str> = payments.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pay_1", "pay_2"]);
    }

    #[tokio::test]
    async fn test_rejected_credentials_fail_the_listing() {
        let base = spawn_fake_gateway().await;
        let trato = account(base, "bad-key");
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();

        let err = trato.fetch_payments(None, today).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized { .. }));
    }
}
