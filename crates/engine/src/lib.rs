//! Budget consumption and ledger consistency engine.
//!
//! The [`Engine`] owns the database connection and exposes every operation
//! of the application: wallet, category, transaction, budget and bill
//! reminder CRUD, the explicit wallet balance recomputation, budget
//! snapshots and the budget alert evaluator.

pub use alerts::{AlertTier, next_alert};
pub use bills::BillReminder;
pub use budgets::{Budget, DEFAULT_ALERT_THRESHOLD};
pub use categories::{Category, CategoryKind};
pub use commands::{
    BillReminderInput, BudgetInput, CategoryInput, NewWallet, TransactionInput, WalletPatch,
};
pub use error::EngineError;
pub use money::MoneyCents;
pub use notifications::{
    DbNotificationSink, Notification, NotificationId, NotificationKind, NotificationSink,
    StoredNotification,
};
pub use ops::{
    BalanceRecomputation, BillReminderView, BudgetWithSnapshot, Engine, EngineBuilder,
    TransactionListFilter,
};
pub use period::{
    BudgetPeriod, PeriodAlignment, PeriodWindow, URGENT_WITHIN_DAYS, Urgency, UrgencyTier,
    urgency_of, window_for,
};
pub use snapshot::{
    BudgetSnapshot, BudgetStatus, EXCEEDED_PERCENTAGE, HALF_PERCENTAGE, consumption_percentage,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;
pub use wallets::{Wallet, WalletKind};

mod alert_states;
mod alerts;
mod bills;
mod budgets;
mod categories;
mod commands;
mod error;
mod locks;
mod money;
mod notifications;
mod ops;
mod period;
mod snapshot;
mod transactions;
mod users;
mod util;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
