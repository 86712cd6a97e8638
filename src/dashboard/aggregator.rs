use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};

use super::progress::goal_snapshot;
use crate::billing::{merge_sources, SourceOutcome};
use crate::db::GoalRepo;
use crate::errors::AppError;
use crate::gateway::{GatewayError, PaymentSource};
use crate::models::{
    DashboardData, DateRange, MonthPeriod, MonthRevenue, MonthlyGoal, PaymentSourceKind, RevenueBySource,
    RevenueTimeline, SourceHealth, SourceState, SourcesHealth,
};

/// The configured payment sources, queried in the fixed Trato, Andrey, External order.
#[derive(Clone)]
pub struct RevenueSources {
    pub trato: Arc<dyn PaymentSource>,
    pub andrey: Option<Arc<dyn PaymentSource>>,
    pub external: Arc<dyn PaymentSource>,
}

impl RevenueSources {
    /// Fetches every source concurrently.
    ///
    /// Gateway failures become failed outcomes; a failure of the local
    /// store is returned as an error for the whole request.
    pub async fn collect(
        &self,
        period: Option<DateRange>,
        today: NaiveDate,
    ) -> Result<Vec<SourceOutcome>, GatewayError> {
        let andrey = async {
            match &self.andrey {
                Some(source) => Some(source.fetch_payments(period, today).await),
                None => None,
            }
        };

        let (trato, andrey, external) = tokio::join!(
            self.trato.fetch_payments(period, today),
            andrey,
            self.external.fetch_payments(period, today),
        );

        let mut outcomes = vec![gateway_outcome(PaymentSourceKind::AsaasTrato, trato)];
        if let Some(result) = andrey {
            outcomes.push(gateway_outcome(PaymentSourceKind::AsaasAndrey, result));
        }
        outcomes.push(SourceOutcome::ok(PaymentSourceKind::External, external?));

        Ok(outcomes)
    }
}

fn gateway_outcome(kind: PaymentSourceKind, result: Result<Vec<crate::models::Payment>, GatewayError>) -> SourceOutcome {
    match result {
        Ok(payments) => SourceOutcome::ok(kind, payments),
        Err(e) => {
            warn!(source = %kind, error = %e, "Payment source failed");
            SourceOutcome::failed(kind, e.to_string())
        }
    }
}

fn source_revenue(outcomes: &[SourceOutcome], kind: PaymentSourceKind) -> Decimal {
    outcomes
        .iter()
        .filter(|o| o.kind == kind)
        .flat_map(|o| o.payments())
        .map(|p| p.value)
        .sum()
}

fn source_health(outcomes: &[SourceOutcome], kind: PaymentSourceKind) -> SourceHealth {
    match outcomes.iter().find(|o| o.kind == kind) {
        Some(SourceOutcome { result: Ok(payments), .. }) => SourceHealth {
            status: SourceState::Ok,
            error: None,
            payments: payments.len(),
        },
        Some(SourceOutcome { result: Err(e), .. }) => SourceHealth {
            status: SourceState::Failed,
            error: Some(e.clone()),
            payments: 0,
        },
        None => SourceHealth {
            status: SourceState::NotConfigured,
            error: None,
            payments: 0,
        },
    }
}

/// Folds one month's source outcomes and goal into the dashboard payload.
pub fn compose_dashboard(
    period: MonthPeriod,
    outcomes: &[SourceOutcome],
    goal: Option<&MonthlyGoal>,
    updated_at: DateTime<Utc>,
) -> DashboardData {
    let revenue = RevenueBySource::new(
        source_revenue(outcomes, PaymentSourceKind::AsaasTrato),
        source_revenue(outcomes, PaymentSourceKind::AsaasAndrey),
        source_revenue(outcomes, PaymentSourceKind::External),
    );

    let merged = merge_sources(outcomes);

    DashboardData {
        month: period.month,
        year: period.year,
        goal: goal_snapshot(goal, period, revenue.total),
        revenue,
        sources: SourcesHealth {
            asaas_trato: source_health(outcomes, PaymentSourceKind::AsaasTrato),
            asaas_andrey: source_health(outcomes, PaymentSourceKind::AsaasAndrey),
            external: source_health(outcomes, PaymentSourceKind::External),
        },
        overdue_count: merged.overdue_from_gateways(),
        active_subscribers: merged.active.len(),
        updated_at,
    }
}

pub async fn monthly_dashboard(
    pool: &PgPool,
    sources: &RevenueSources,
    period: MonthPeriod,
    today: NaiveDate,
) -> Result<DashboardData, AppError> {
    let outcomes = sources.collect(Some(period.range()), today).await?;
    let goal = GoalRepo::get(pool, period.year, period.month).await?;

    let dashboard = compose_dashboard(period, &outcomes, goal.as_ref(), Utc::now());
    info!(
        year = period.year,
        month = period.month,
        total = %dashboard.revenue.total,
        overdue = dashboard.overdue_count,
        "Monthly dashboard computed"
    );
    Ok(dashboard)
}

/// Summarizes twelve monthly dashboards. Ties for best and worst month keep
/// the earliest month.
pub fn build_timeline(year: i32, months: &[DashboardData], updated_at: DateTime<Utc>) -> RevenueTimeline {
    let entries: Vec<MonthRevenue> = months
        .iter()
        .map(|d| MonthRevenue {
            month: d.month,
            revenue: d.revenue.clone(),
            goal_amount: d.goal.amount,
            overdue_count: d.overdue_count,
        })
        .collect();

    let total_revenue: Decimal = entries.iter().map(|m| m.revenue.total).sum();
    let goal_total: Decimal = entries.iter().map(|m| m.goal_amount).sum();

    let mut best: Option<&MonthRevenue> = None;
    let mut worst: Option<&MonthRevenue> = None;
    for entry in &entries {
        if best.map_or(true, |b| entry.revenue.total > b.revenue.total) {
            best = Some(entry);
        }
        if worst.map_or(true, |w| entry.revenue.total < w.revenue.total) {
            worst = Some(entry);
        }
    }

    RevenueTimeline {
        year,
        best_month: best.cloned(),
        worst_month: worst.cloned(),
        total_revenue,
        goal_total,
        average_monthly_revenue: (total_revenue / Decimal::from(12)).round_dp(2),
        months: entries,
        updated_at,
    }
}

/// Keeps only the payments settled inside `range`; failed outcomes stay failed.
pub fn outcomes_within(outcomes: &[SourceOutcome], range: DateRange) -> Vec<SourceOutcome> {
    outcomes
        .iter()
        .map(|o| SourceOutcome {
            kind: o.kind,
            result: o.result.as_ref().map_err(Clone::clone).map(|payments| {
                payments
                    .iter()
                    .filter(|p| range.contains(p.last_payment_date))
                    .cloned()
                    .collect()
            }),
        })
        .collect()
}

/// Annual view. Sources and goals are fetched once for the whole year and
/// split into months locally.
pub async fn revenue_timeline(
    pool: &PgPool,
    sources: &RevenueSources,
    year: i32,
    today: NaiveDate,
) -> Result<RevenueTimeline, AppError> {
    let range = DateRange::year(year).ok_or_else(|| AppError::bad_request(format!("Invalid year {year}")))?;
    let outcomes = sources.collect(Some(range), today).await?;
    let goals = GoalRepo::list(pool, Some(year)).await?;
    let updated_at = Utc::now();

    let months: Vec<DashboardData> = (1..=12)
        .filter_map(|month| MonthPeriod::new(year, month))
        .map(|period| {
            let goal = goals.iter().find(|g| g.month == period.month as i32);
            compose_dashboard(period, &outcomes_within(&outcomes, period.range()), goal, updated_at)
        })
        .collect();

    let timeline = build_timeline(year, &months, updated_at);
    info!(year, total = %timeline.total_revenue, "Revenue timeline computed");
    Ok(timeline)
}
