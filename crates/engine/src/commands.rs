//! Command structs for engine write operations.
//!
//! These types group the parameters of create/replace operations, keeping
//! call sites readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{BudgetPeriod, CategoryKind, TransactionKind, WalletKind};

/// Create a wallet.
#[derive(Clone, Debug)]
pub struct NewWallet {
    pub name: String,
    pub kind: WalletKind,
    pub overdraft_limit: i64,
    /// Recorded as an opening income (or expense, when negative) so the
    /// balance stays equal to the sum of the wallet's transactions.
    pub opening_balance_minor: i64,
    pub opened_on: NaiveDate,
}

impl NewWallet {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: WalletKind, opened_on: NaiveDate) -> Self {
        Self {
            name: name.into(),
            kind,
            overdraft_limit: 0,
            opening_balance_minor: 0,
            opened_on,
        }
    }

    #[must_use]
    pub fn overdraft_limit(mut self, limit_minor: i64) -> Self {
        self.overdraft_limit = limit_minor;
        self
    }

    #[must_use]
    pub fn opening_balance(mut self, balance_minor: i64) -> Self {
        self.opening_balance_minor = balance_minor;
        self
    }
}

/// Partial update of a wallet. `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct WalletPatch {
    pub name: Option<String>,
    pub kind: Option<WalletKind>,
    pub overdraft_limit: Option<i64>,
}

impl WalletPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.overdraft_limit.is_none()
    }
}

/// Full definition of a category.
#[derive(Clone, Debug)]
pub struct CategoryInput {
    pub name: String,
    pub kind: CategoryKind,
}

/// Full definition of a transaction, used to create or replace one.
#[derive(Clone, Debug)]
pub struct TransactionInput {
    pub wallet_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub occurred_on: NaiveDate,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
}

impl TransactionInput {
    #[must_use]
    pub fn income(wallet_id: Uuid, amount_minor: i64, occurred_on: NaiveDate) -> Self {
        Self::with_kind(wallet_id, TransactionKind::Income, amount_minor, occurred_on)
    }

    #[must_use]
    pub fn expense(wallet_id: Uuid, amount_minor: i64, occurred_on: NaiveDate) -> Self {
        Self::with_kind(wallet_id, TransactionKind::Expense, amount_minor, occurred_on)
    }

    fn with_kind(
        wallet_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            wallet_id,
            kind,
            amount_minor,
            occurred_on,
            category_id: None,
            description: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Full definition of a budget, used to create or replace one.
#[derive(Clone, Debug)]
pub struct BudgetInput {
    pub name: String,
    pub amount_minor: i64,
    pub category_id: Option<Uuid>,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    /// Defaults to [`DEFAULT_ALERT_THRESHOLD`](crate::DEFAULT_ALERT_THRESHOLD).
    pub alert_threshold: Option<i32>,
}

impl BudgetInput {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        amount_minor: i64,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            amount_minor,
            category_id: None,
            period,
            start_date,
            alert_threshold: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn alert_threshold(mut self, threshold: i32) -> Self {
        self.alert_threshold = Some(threshold);
        self
    }
}

/// Full definition of a bill reminder.
#[derive(Clone, Debug)]
pub struct BillReminderInput {
    pub name: String,
    pub amount_minor: i64,
    pub due_on: NaiveDate,
    pub paid: bool,
}
