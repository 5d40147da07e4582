//! JSON request and response bodies of the HTTP API.
//!
//! Field names are camelCase on the wire. Money is always an integer amount
//! of minor units (cents) and dates are `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod wallet {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum WalletKind {
        Checking,
        Savings,
        Credit,
        Cash,
        Investment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletNew {
        pub name: String,
        pub kind: WalletKind,
        pub overdraft_limit: Option<i64>,
        /// Recorded as an opening transaction when non-zero.
        pub opening_balance_minor: Option<i64>,
        /// Date of the opening transaction. Defaults to today.
        pub opened_on: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletUpdate {
        pub name: Option<String>,
        pub kind: Option<WalletKind>,
        pub overdraft_limit: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletView {
        pub id: Uuid,
        pub name: String,
        pub kind: WalletKind,
        pub balance_minor: i64,
        pub overdraft_limit: i64,
        pub overdrawn: bool,
        pub version: i64,
    }

    /// Response of `POST /wallets/{id}/recalculate`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BalanceRecalculated {
        pub wallet_id: Uuid,
        pub old_balance: i64,
        pub new_balance: i64,
        pub corrected: bool,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryInput {
        pub name: String,
        pub kind: CategoryKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: CategoryKind,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    /// Body of `POST /transactions` and `PUT /transactions/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionInput {
        pub wallet_id: Uuid,
        pub kind: TransactionKind,
        /// Must be > 0. The kind defines the sign.
        pub amount_minor: i64,
        pub occurred_on: NaiveDate,
        pub category_id: Option<Uuid>,
        pub description: Option<String>,
    }

    /// Query of `GET /transactions`. `from` is inclusive, `to` exclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionList {
        pub wallet_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub wallet_id: Uuid,
        pub category_id: Option<Uuid>,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub occurred_on: NaiveDate,
        pub description: Option<String>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Month,
        Year,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetStatus {
        Good,
        Half,
        Warning,
        Exceeded,
    }

    /// Body of `POST /budgets` and `PUT /budgets/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetInput {
        pub name: String,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        pub period: BudgetPeriod,
        pub start_date: NaiveDate,
        /// Percentage in `0..=100`. Defaults to 80.
        pub alert_threshold: Option<i32>,
    }

    /// `?asOf=YYYY-MM-DD`, defaulting to today.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AsOf {
        pub as_of: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetSnapshotView {
        pub period_start: NaiveDate,
        /// Exclusive.
        pub period_end: NaiveDate,
        pub spent: i64,
        pub remaining: i64,
        pub percentage: i64,
        pub status: BudgetStatus,
        /// Absent once the period is over.
        pub days_remaining: Option<i64>,
        pub alert_message: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        pub period: BudgetPeriod,
        pub start_date: NaiveDate,
        pub alert_threshold: i32,
        /// Consumption for `asOf`, inlined into the budget object.
        #[serde(flatten)]
        pub snapshot: BudgetSnapshotView,
    }
}

pub mod notification {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum NotificationKind {
        BudgetHalf,
        BudgetAlert,
        BudgetExceeded,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct NotificationList {
        pub unread_only: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct NotificationView {
        pub id: Uuid,
        pub kind: NotificationKind,
        pub message: String,
        pub created_at: DateTime<Utc>,
        pub read: bool,
    }
}

pub mod reminder {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Urgency {
        Overdue,
        Urgent,
        Upcoming,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReminderInput {
        pub name: String,
        pub amount_minor: i64,
        pub due_on: NaiveDate,
        #[serde(default)]
        pub paid: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReminderList {
        pub as_of: Option<NaiveDate>,
        pub include_paid: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReminderView {
        pub id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub due_on: NaiveDate,
        pub paid: bool,
        pub urgency: Urgency,
        /// Negative when overdue.
        pub days_until: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_input_uses_camel_case() {
        let body = serde_json::json!({
            "name": "Food",
            "amountMinor": 25000,
            "period": "month",
            "startDate": "2026-01-01",
            "alertThreshold": 75
        });
        let input: budget::BudgetInput = serde_json::from_value(body).unwrap();
        assert_eq!(input.amount_minor, 25000);
        assert_eq!(input.period, budget::BudgetPeriod::Month);
        assert_eq!(input.category_id, None);
        assert_eq!(input.alert_threshold, Some(75));
    }

    #[test]
    fn reminder_paid_defaults_to_false() {
        let body = serde_json::json!({
            "name": "Rent",
            "amountMinor": 90000,
            "dueOn": "2026-02-01"
        });
        let input: reminder::ReminderInput = serde_json::from_value(body).unwrap();
        assert!(!input.paid);
    }

    #[test]
    fn snapshot_serializes_status_in_snake_case() {
        let view = budget::BudgetSnapshotView {
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            spent: 20000,
            remaining: 5000,
            percentage: 80,
            status: budget::BudgetStatus::Warning,
            days_remaining: Some(17),
            alert_message: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["spent"], 20000);
        assert_eq!(json["periodEnd"], "2026-02-01");
    }

    #[test]
    fn budget_view_inlines_snapshot_fields() {
        let view = budget::BudgetView {
            id: Uuid::nil(),
            name: "Monthly".to_string(),
            amount_minor: 25000,
            category_id: None,
            period: budget::BudgetPeriod::Month,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            alert_threshold: 80,
            snapshot: budget::BudgetSnapshotView {
                period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                period_end: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                spent: 20000,
                remaining: 5000,
                percentage: 80,
                status: budget::BudgetStatus::Warning,
                days_remaining: Some(17),
                alert_message: Some("near".to_string()),
            },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["spent"], 20000);
        assert_eq!(json["remaining"], 5000);
        assert_eq!(json["daysRemaining"], 17);
        assert_eq!(json["alertMessage"], "near");
        assert!(json.get("snapshot").is_none());

        let back: budget::BudgetView = serde_json::from_value(json).unwrap();
        assert_eq!(back.snapshot.percentage, 80);
    }
}
