use chrono::NaiveDate;
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind, transactions};

use super::super::Engine;

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`).
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub wallet_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u64>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidDate(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.limit == Some(0) {
        return Err(EngineError::InvalidAmount(
            "limit must be > 0".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(wallet_id) = filter.wallet_id {
            self = self.filter(transactions::Column::WalletId.eq(wallet_id));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredOn.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredOn.lt(to));
        }
        self
    }
}

impl Engine {
    /// Return a single transaction.
    pub async fn transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = self
            .require_transaction(&self.database, user_id, transaction_id)
            .await?;
        Transaction::try_from(model)
    }

    /// Lists the user's transactions, newest first.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .apply_tx_filters(filter)
            .order_by_desc(transactions::Column::OccurredOn)
            .order_by_desc(transactions::Column::Id);
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Sum of expenses in `[from, to)`, optionally restricted to a category.
    pub(in crate::ops) async fn sum_expenses(
        &self,
        user_id: &str,
        category_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<MoneyCents> {
        let filter = TransactionListFilter {
            category_id,
            kind: Some(TransactionKind::Expense),
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };
        let amounts = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .apply_tx_filters(&filter)
            .select_only()
            .column(transactions::Column::AmountMinor)
            .into_tuple::<i64>()
            .all(&self.database)
            .await?;
        MoneyCents::try_sum(amounts.into_iter().map(MoneyCents::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn empty_range_is_rejected() {
        let filter = TransactionListFilter {
            from: Some(day(10)),
            to: Some(day(10)),
            ..Default::default()
        };
        assert!(matches!(
            validate_list_filter(&filter),
            Err(EngineError::InvalidDate(_))
        ));
    }

    #[test]
    fn open_range_is_accepted() {
        let filter = TransactionListFilter {
            from: Some(day(1)),
            ..Default::default()
        };
        assert!(validate_list_filter(&filter).is_ok());
    }
}
