//! Budget alert state machine.
//!
//! For each `(budget, period index)` the engine remembers the highest tier
//! it has already notified. The recorded tier only moves up:
//!
//! ```text
//! none -> half -> warning -> exceeded
//! ```
//!
//! A snapshot emits an alert only when its status tier is strictly above the
//! recorded one. Skipping tiers is allowed (none -> exceeded emits a single
//! `exceeded` alert). A new period has no recorded tier, so it starts again
//! from `none`.

use serde::{Deserialize, Serialize};

use crate::{BudgetSnapshot, BudgetStatus, EngineError, NotificationKind};

/// A status tier worth notifying. `good` has no tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    Half,
    Warning,
    Exceeded,
}

impl AlertTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Half => "half",
            Self::Warning => "warning",
            Self::Exceeded => "exceeded",
        }
    }

    pub fn from_status(status: BudgetStatus) -> Option<Self> {
        match status {
            BudgetStatus::Good => None,
            BudgetStatus::Half => Some(Self::Half),
            BudgetStatus::Warning => Some(Self::Warning),
            BudgetStatus::Exceeded => Some(Self::Exceeded),
        }
    }

    pub fn notification_kind(self) -> NotificationKind {
        match self {
            Self::Half => NotificationKind::BudgetHalf,
            Self::Warning => NotificationKind::BudgetAlert,
            Self::Exceeded => NotificationKind::BudgetExceeded,
        }
    }
}

impl TryFrom<&str> for AlertTier {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "half" => Ok(Self::Half),
            "warning" => Ok(Self::Warning),
            "exceeded" => Ok(Self::Exceeded),
            other => Err(EngineError::InvalidName(format!(
                "invalid alert tier: {other}"
            ))),
        }
    }
}

/// The tier to notify, if `status` crosses above `last_notified`.
pub fn next_alert(last_notified: Option<AlertTier>, status: BudgetStatus) -> Option<AlertTier> {
    let candidate = AlertTier::from_status(status)?;
    match last_notified {
        Some(last) if last >= candidate => None,
        _ => Some(candidate),
    }
}

/// Text of the notification for `tier`.
pub(crate) fn alert_text(budget_name: &str, tier: AlertTier, snapshot: &BudgetSnapshot) -> String {
    match (&snapshot.alert_message, tier) {
        (Some(message), AlertTier::Warning | AlertTier::Exceeded) => message.clone(),
        _ => format!(
            "Budget '{budget_name}' is {}% spent, {} days left in this period",
            snapshot.percentage,
            snapshot.days_remaining.unwrap_or(0)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_crossing_emits() {
        assert_eq!(next_alert(None, BudgetStatus::Half), Some(AlertTier::Half));
        assert_eq!(next_alert(None, BudgetStatus::Good), None);
    }

    #[test]
    fn same_tier_does_not_repeat() {
        assert_eq!(
            next_alert(Some(AlertTier::Warning), BudgetStatus::Warning),
            None
        );
    }

    #[test]
    fn never_regresses() {
        assert_eq!(next_alert(Some(AlertTier::Exceeded), BudgetStatus::Half), None);
        assert_eq!(next_alert(Some(AlertTier::Warning), BudgetStatus::Good), None);
    }

    #[test]
    fn skipping_tiers_emits_highest_once() {
        assert_eq!(
            next_alert(None, BudgetStatus::Exceeded),
            Some(AlertTier::Exceeded)
        );
        assert_eq!(
            next_alert(Some(AlertTier::Half), BudgetStatus::Exceeded),
            Some(AlertTier::Exceeded)
        );
    }

    #[test]
    fn tiers_map_to_notification_kinds() {
        assert_eq!(
            AlertTier::Warning.notification_kind(),
            NotificationKind::BudgetAlert
        );
        assert_eq!(
            AlertTier::Exceeded.notification_kind(),
            NotificationKind::BudgetExceeded
        );
    }
}
