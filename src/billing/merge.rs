use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{Payment, PaymentSourceKind, UNKNOWN_CUSTOMER_NAME};

/// Result of one source fetch, successful or not.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub kind: PaymentSourceKind,
    pub result: Result<Vec<Payment>, String>,
}

impl SourceOutcome {
    pub fn ok(kind: PaymentSourceKind, payments: Vec<Payment>) -> Self {
        Self { kind, result: Ok(payments) }
    }

    pub fn failed(kind: PaymentSourceKind, error: impl Into<String>) -> Self {
        Self { kind, result: Err(error.into()) }
    }

    pub fn payments(&self) -> &[Payment] {
        match &self.result {
            Ok(payments) => payments,
            Err(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedPayments {
    /// One record per subscriber, in arrival order of first appearance.
    pub active: Vec<Payment>,
    pub overdue: Vec<Payment>,
    pub errors: BTreeMap<PaymentSourceKind, String>,
}

impl MergedPayments {
    pub fn overdue_from_gateways(&self) -> usize {
        self.overdue.iter().filter(|p| p.source.is_gateway()).count()
    }
}

/// Whether `candidate` should replace `incumbent` on a dedup collision.
pub fn outranks(candidate: &Payment, incumbent: &Payment) -> bool {
    candidate.source.priority_rank() < incumbent.source.priority_rank()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MatchKey {
    Email(String),
    Name(String),
    Id(String),
}

fn match_keys(payment: &Payment) -> Vec<MatchKey> {
    let mut keys = Vec::with_capacity(3);

    let email = payment.customer_email.trim().to_lowercase();
    if !email.is_empty() {
        keys.push(MatchKey::Email(email));
    }

    let name = payment.customer_name.trim();
    if !name.is_empty() && name != UNKNOWN_CUSTOMER_NAME {
        keys.push(MatchKey::Name(name.to_lowercase()));
    }

    if !payment.id.is_empty() {
        keys.push(MatchKey::Id(payment.id.clone()));
    }

    keys
}

/// Concatenates source results in the fixed Trato, Andrey, External order and
/// collapses active payments to one record per subscriber.
///
/// Two records belong to the same subscriber when they share an email, a name
/// or an id. On collision the higher-priority source wins; equal priority keeps
/// the record seen first.
pub fn merge_sources(outcomes: &[SourceOutcome]) -> MergedPayments {
    let mut merged = MergedPayments::default();
    let mut slots: Vec<Payment> = Vec::new();
    let mut index: HashMap<MatchKey, usize> = HashMap::new();

    for kind in PaymentSourceKind::ALL {
        for outcome in outcomes.iter().filter(|o| o.kind == kind) {
            let payments = match &outcome.result {
                Ok(payments) => payments,
                Err(e) => {
                    merged.errors.insert(kind, e.clone());
                    continue;
                }
            };

            for payment in payments {
                if !payment.is_active() {
                    merged.overdue.push(payment.clone());
                    continue;
                }

                let keys = match_keys(payment);
                let slot = keys.iter().filter_map(|k| index.get(k).copied()).min();

                let slot = match slot {
                    Some(slot) => {
                        if outranks(payment, &slots[slot]) {
                            slots[slot] = payment.clone();
                        }
                        slot
                    }
                    None => {
                        slots.push(payment.clone());
                        slots.len() - 1
                    }
                };

                for key in keys {
                    index.entry(key).or_insert(slot);
                }
            }
        }
    }

    merged.active = slots;
    merged
}
