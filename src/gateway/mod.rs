//! Payment source adapters.
//!
//! Each adapter fetches one upstream's confirmed payments and normalizes them
//! into [`Payment`]. Per-record problems are absorbed by the adapter; only a
//! failure of the upstream listing itself is returned as an error.

pub mod asaas;
pub mod external;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{DateRange, Payment, PaymentSourceKind};

pub use asaas::AsaasAccount;
pub use external::ExternalSubscriptionSource;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{account}: request failed: {message}")]
    Request { account: String, message: String },

    #[error("{account}: credentials rejected")]
    Unauthorized { account: String },

    #[error("{account}: HTTP {status} - {body}")]
    Status { account: String, status: u16, body: String },

    #[error("{account}: unexpected response: {message}")]
    Decode { account: String, message: String },

    #[error("{source_name}: store unavailable: {message}")]
    Store { source_name: String, message: String },
}

#[async_trait]
pub trait PaymentSource: Send + Sync {
    fn kind(&self) -> PaymentSourceKind;

    /// Fetch normalized payments, optionally restricted to those whose last
    /// payment date falls inside `period`.
    async fn fetch_payments(
        &self,
        period: Option<DateRange>,
        today: NaiveDate,
    ) -> Result<Vec<Payment>, GatewayError>;
}
