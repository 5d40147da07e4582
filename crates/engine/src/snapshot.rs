//! Budget consumption snapshots.
//!
//! A [`BudgetSnapshot`] is the derived view of one budget over one period
//! window: how much was spent, what is left, and which status tier that puts
//! the budget in. Snapshots are recomputed on every read and never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Budget, MoneyCents, PeriodWindow};

/// Percentage from which a budget is at least `half`.
pub const HALF_PERCENTAGE: i64 = 50;
/// Percentage from which a budget is `exceeded`.
pub const EXCEEDED_PERCENTAGE: i64 = 100;

/// Consumption tier of a budget, ordered from least to most consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Good,
    Half,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Half => "half",
            Self::Warning => "warning",
            Self::Exceeded => "exceeded",
        }
    }

    /// Classifies a consumption percentage.
    ///
    /// Tiers are checked from the top: `exceeded` at 100%, `warning` from the
    /// alert threshold, `half` from 50%. A threshold at or below 50 therefore
    /// skips `half` entirely.
    pub fn classify(percentage: i64, alert_threshold: i32) -> Self {
        if percentage >= EXCEEDED_PERCENTAGE {
            Self::Exceeded
        } else if percentage >= i64::from(alert_threshold) {
            Self::Warning
        } else if percentage >= HALF_PERCENTAGE {
            Self::Half
        } else {
            Self::Good
        }
    }
}

/// `round(spent / amount * 100)`, half rounded up, `0` when `amount` is not
/// positive. Not clamped: an overspent budget reports more than 100.
pub fn consumption_percentage(spent: MoneyCents, amount: MoneyCents) -> i64 {
    let amount = i128::from(amount.cents());
    if amount <= 0 {
        return 0;
    }
    let spent = i128::from(spent.cents().max(0));
    let rounded = (spent * 100 + amount / 2) / amount;
    i64::try_from(rounded).unwrap_or(i64::MAX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetSnapshot {
    pub budget_id: Uuid,
    pub window: PeriodWindow,
    pub period_index: i64,
    pub spent: i64,
    /// `max(0, amount - spent)`.
    pub remaining: i64,
    pub percentage: i64,
    pub status: BudgetStatus,
    /// Days until the window closes; `None` once `as_of` is past it.
    pub days_remaining: Option<i64>,
    /// Human readable alert, set when `percentage >= alert_threshold`.
    pub alert_message: Option<String>,
}

impl BudgetSnapshot {
    /// Builds the snapshot of `budget` for `window` given the expenses
    /// already summed for that window.
    pub fn compute(
        budget: &Budget,
        window: PeriodWindow,
        spent: MoneyCents,
        as_of: NaiveDate,
    ) -> Self {
        let amount = MoneyCents::new(budget.amount_minor);
        let percentage = consumption_percentage(spent, amount);
        let status = BudgetStatus::classify(percentage, budget.alert_threshold);
        let remaining = amount.saturating_sub(spent).max(MoneyCents::ZERO);

        let alert_message = (percentage >= i64::from(budget.alert_threshold)).then(|| {
            if status == BudgetStatus::Exceeded {
                format!(
                    "Budget '{}' exceeded: {spent} spent of {amount}",
                    budget.name
                )
            } else {
                format!(
                    "Budget '{}' has reached {percentage}% ({spent} of {amount})",
                    budget.name
                )
            }
        });

        Self {
            budget_id: budget.id,
            window,
            period_index: window.index(),
            spent: spent.cents(),
            remaining: remaining.cents(),
            percentage,
            status,
            days_remaining: window.days_remaining(as_of),
            alert_message,
        }
    }
}
