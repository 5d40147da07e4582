use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionInput, transactions,
    util::normalize_optional_text,
};

use super::super::{Engine, with_tx};

fn build_transaction(id: Option<Uuid>, input: &TransactionInput) -> ResultEngine<Transaction> {
    let mut tx = Transaction::new(
        input.wallet_id,
        input.kind,
        input.amount_minor,
        input.occurred_on,
    )?;
    if let Some(id) = id {
        tx.id = id;
    }
    tx.category_id = input.category_id;
    tx.description = normalize_optional_text(input.description.as_deref());
    Ok(tx)
}

impl Engine {
    /// Records a transaction and moves the wallet balance by its signed
    /// amount, atomically.
    pub async fn create_transaction(
        &self,
        user_id: &str,
        input: TransactionInput,
    ) -> ResultEngine<Transaction> {
        let tx = build_transaction(None, &input)?;

        let _guard = self.wallet_locks.lock(tx.wallet_id).await;
        with_tx!(self, |db_tx| {
            self.require_wallet(&db_tx, user_id, tx.wallet_id).await?;
            self.require_optional_category(&db_tx, user_id, tx.category_id)
                .await?;

            let mut model: transactions::ActiveModel = (&tx).into();
            model.user_id = ActiveValue::Set(user_id.to_string());
            model.insert(&db_tx).await?;

            self.apply_balance_changes(&db_tx, user_id, tx.wallet_id, &[tx.signed_amount()])
                .await
        })?;

        tracing::debug!(
            %user_id,
            transaction_id = %tx.id,
            wallet_id = %tx.wallet_id,
            amount_minor = tx.amount_minor,
            kind = tx.kind.as_str(),
            "transaction created"
        );
        Ok(tx)
    }

    /// Replaces a transaction.
    ///
    /// The old signed amount is reverted from its wallet and the new one
    /// applied to the (possibly different) target wallet in the same DB
    /// transaction.
    pub async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
        input: TransactionInput,
    ) -> ResultEngine<Transaction> {
        let updated = build_transaction(Some(transaction_id), &input)?;
        let seen = self
            .require_transaction(&self.database, user_id, transaction_id)
            .await?;

        let _guards = self
            .wallet_locks
            .lock_all(vec![seen.wallet_id, updated.wallet_id])
            .await;
        with_tx!(self, |db_tx| {
            let current = self
                .locked_transaction(&db_tx, user_id, transaction_id, seen.wallet_id)
                .await?;
            self.require_wallet(&db_tx, user_id, updated.wallet_id)
                .await?;
            self.require_optional_category(&db_tx, user_id, updated.category_id)
                .await?;

            let model: transactions::ActiveModel = (&updated).into();
            model.update(&db_tx).await?;

            if current.wallet_id == updated.wallet_id {
                self.apply_balance_changes(
                    &db_tx,
                    user_id,
                    updated.wallet_id,
                    &[-current.signed_amount(), updated.signed_amount()],
                )
                .await?;
            } else {
                self.apply_balance_changes(
                    &db_tx,
                    user_id,
                    current.wallet_id,
                    &[-current.signed_amount()],
                )
                .await?;
                self.apply_balance_changes(
                    &db_tx,
                    user_id,
                    updated.wallet_id,
                    &[updated.signed_amount()],
                )
                .await?;
            }
            Ok(())
        })?;

        tracing::debug!(%user_id, %transaction_id, "transaction updated");
        Ok(updated)
    }

    /// Deletes a transaction and reverts its effect on the wallet balance.
    pub async fn delete_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        let seen = self
            .require_transaction(&self.database, user_id, transaction_id)
            .await?;

        let _guard = self.wallet_locks.lock(seen.wallet_id).await;
        with_tx!(self, |db_tx| {
            let current = self
                .locked_transaction(&db_tx, user_id, transaction_id, seen.wallet_id)
                .await?;
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;
            self.apply_balance_changes(
                &db_tx,
                user_id,
                current.wallet_id,
                &[-current.signed_amount()],
            )
            .await
        })?;

        tracing::debug!(%user_id, %transaction_id, "transaction deleted");
        Ok(())
    }

    /// Re-reads a transaction once its wallet lock is held and checks it was
    /// not moved to another wallet in between.
    async fn locked_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transaction_id: Uuid,
        locked_wallet_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let current =
            Transaction::try_from(self.require_transaction(db_tx, user_id, transaction_id).await?)?;
        if current.wallet_id != locked_wallet_id {
            return Err(EngineError::ConsistencyConflict(format!(
                "transaction {transaction_id} moved to another wallet"
            )));
        }
        Ok(current)
    }
}
