use std::{fmt, sync::Arc};

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    DbNotificationSink, EngineError, NotificationSink, PeriodAlignment, ResultEngine,
    locks::KeyedLocks,
};

mod access;
mod alerts;
mod bills;
mod budgets;
mod categories;
mod notifications;
mod transactions;
mod wallets;

pub use bills::BillReminderView;
pub use budgets::BudgetWithSnapshot;
pub use transactions::TransactionListFilter;
pub use wallets::BalanceRecomputation;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn NotificationSink>,
    alignment: PeriodAlignment,
    /// Serializes balance writers per wallet.
    wallet_locks: KeyedLocks<Uuid>,
    /// Serializes alert evaluation per `(budget_id, period_index)`.
    alert_locks: KeyedLocks<(Uuid, i64)>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("alignment", &self.alignment)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// How budget windows are aligned.
    pub fn alignment(&self) -> PeriodAlignment {
        self.alignment
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
    notifier: Option<Arc<dyn NotificationSink>>,
    alignment: PeriodAlignment,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Replace the default sink, which stores notifications in the database.
    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> EngineBuilder {
        self.notifier = Some(sink);
        self
    }

    pub fn alignment(mut self, alignment: PeriodAlignment) -> EngineBuilder {
        self.alignment = alignment;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let database = self
            .database
            .ok_or_else(|| EngineError::KeyNotFound("database".to_string()))?;
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(DbNotificationSink::new(database.clone())));
        Ok(Engine {
            database,
            notifier,
            alignment: self.alignment,
            wallet_locks: KeyedLocks::default(),
            alert_locks: KeyedLocks::default(),
        })
    }
}
