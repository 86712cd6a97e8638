use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{default_goal_description, GoalSnapshot, GoalStatus, MonthPeriod, MonthlyGoal};

pub const SUCCESS_THRESHOLD_PCT: f64 = 100.0;
pub const WARNING_THRESHOLD_PCT: f64 = 75.0;

/// Share of the goal reached, in percent. Zero when no goal is set.
pub fn goal_percentage(total: Decimal, goal_amount: Decimal) -> f64 {
    if goal_amount <= Decimal::ZERO {
        return 0.0;
    }
    let pct = (total / goal_amount * Decimal::ONE_HUNDRED).round_dp(2);
    pct.to_f64().unwrap_or(0.0)
}

pub fn goal_status(percentage: f64) -> GoalStatus {
    if percentage >= SUCCESS_THRESHOLD_PCT {
        GoalStatus::Success
    } else if percentage >= WARNING_THRESHOLD_PCT {
        GoalStatus::Warning
    } else {
        GoalStatus::Danger
    }
}

pub fn goal_snapshot(goal: Option<&MonthlyGoal>, period: MonthPeriod, total: Decimal) -> GoalSnapshot {
    let (amount, description) = match goal {
        Some(g) => (g.goal_amount, g.description.clone()),
        None => (Decimal::ZERO, default_goal_description(period.year, period.month)),
    };
    let percentage = goal_percentage(total, amount);

    GoalSnapshot {
        amount,
        description,
        percentage,
        status: goal_status(percentage),
    }
}
