use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upstream that produced a normalized payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentSourceKind {
    AsaasTrato,
    AsaasAndrey,
    External,
}

impl PaymentSourceKind {
    /// Fixed merge order; results are concatenated in this sequence.
    pub const ALL: [PaymentSourceKind; 3] = [Self::AsaasTrato, Self::AsaasAndrey, Self::External];

    /// Lower rank wins a dedup collision.
    pub fn priority_rank(self) -> u8 {
        match self {
            Self::AsaasTrato => 0,
            Self::AsaasAndrey => 1,
            Self::External => 2,
        }
    }

    pub fn is_gateway(self) -> bool {
        !matches!(self, Self::External)
    }
}

impl std::fmt::Display for PaymentSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AsaasTrato => write!(f, "ASAAS_TRATO"),
            Self::AsaasAndrey => write!(f, "ASAAS_ANDREY"),
            Self::External => write!(f, "EXTERNAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Ativo,
    Atrasado,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ativo => write!(f, "ATIVO"),
            Self::Atrasado => write!(f, "ATRASADO"),
        }
    }
}

/// Largest amount a `NUMERIC(12, 2)` money column holds.
pub fn max_money_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}
