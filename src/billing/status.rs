//! Due-date and status derivation for subscription payments.
//! Every caller passes `today` explicitly so results are deterministic.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Payment, SubscriptionStatus};

pub const BILLING_CYCLE_DAYS: i64 = 30;
pub const OVERDUE_GRACE_DAYS: i64 = 1;
pub const UPCOMING_WINDOW_DAYS: i64 = 7;
pub const NEW_SUBSCRIBER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub next_due_date: NaiveDate,
    pub status: SubscriptionStatus,
}

pub fn next_due_date(last_payment_date: NaiveDate) -> NaiveDate {
    last_payment_date + Duration::days(BILLING_CYCLE_DAYS)
}

/// Negative once the due date has passed.
pub fn days_until_due(next_due_date: NaiveDate, today: NaiveDate) -> i64 {
    (next_due_date - today).num_days()
}

/// `ATRASADO` only once more than the grace window has elapsed past the due date.
pub fn classify_subscription(last_payment_date: NaiveDate, today: NaiveDate) -> Classification {
    let next_due_date = next_due_date(last_payment_date);
    let days_overdue = (today - next_due_date).num_days();

    let status = if days_overdue > OVERDUE_GRACE_DAYS {
        SubscriptionStatus::Atrasado
    } else {
        SubscriptionStatus::Ativo
    };

    Classification { next_due_date, status }
}

/// Buckets exposed by the subscriber table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterKind {
    #[default]
    All,
    Ativos,
    ProximosVencer,
    Vencido,
    NovosAssinantes,
}

impl FilterKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "ALL" | "TODOS" => Some(Self::All),
            "ATIVOS" => Some(Self::Ativos),
            "PROXIMOS_VENCER" => Some(Self::ProximosVencer),
            "VENCIDO" | "VENCIDOS" => Some(Self::Vencido),
            "NOVOS_ASSINANTES" => Some(Self::NovosAssinantes),
            _ => None,
        }
    }
}

/// Filter predicate shared by the subscriber listing and dashboard counters.
///
/// `VENCIDO` triggers as soon as the due date passes, one day before
/// `classify_subscription` reports `ATRASADO`.
pub fn matches_filter(payment: &Payment, kind: FilterKind, today: NaiveDate) -> bool {
    match kind {
        FilterKind::All => true,
        FilterKind::Ativos => payment.status == SubscriptionStatus::Ativo,
        FilterKind::ProximosVencer => {
            let days = days_until_due(payment.next_due_date, today);
            (0..=UPCOMING_WINDOW_DAYS).contains(&days)
        }
        FilterKind::Vencido => days_until_due(payment.next_due_date, today) < 0,
        FilterKind::NovosAssinantes => payment
            .created_at
            .map(|created| {
                let age = (today - created).num_days();
                (0..=NEW_SUBSCRIBER_WINDOW_DAYS).contains(&age)
            })
            .unwrap_or(false),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounts {
    pub all: usize,
    pub ativos: usize,
    pub proximos_vencer: usize,
    pub vencido: usize,
    pub novos_assinantes: usize,
}

impl FilterCounts {
    pub fn tally(payments: &[Payment], today: NaiveDate) -> Self {
        let count = |kind| payments.iter().filter(|p| matches_filter(p, kind, today)).count();
        Self {
            all: payments.len(),
            ativos: count(FilterKind::Ativos),
            proximos_vencer: count(FilterKind::ProximosVencer),
            vencido: count(FilterKind::Vencido),
            novos_assinantes: count(FilterKind::NovosAssinantes),
        }
    }
}
