use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, NewWallet, ResultEngine, Transaction, TransactionKind, Wallet,
    WalletPatch, transactions,
    util::{name_key, normalize_required_name},
    wallets,
};

use super::{Engine, with_tx};

/// Outcome of [`Engine::recompute_wallet_balance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceRecomputation {
    pub old_balance: i64,
    pub new_balance: i64,
}

impl BalanceRecomputation {
    /// `true` when the stored balance had drifted from the ledger.
    pub fn corrected(&self) -> bool {
        self.old_balance != self.new_balance
    }
}

impl Engine {
    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, user_id: &str, wallet_id: Uuid) -> ResultEngine<Wallet> {
        let model = self
            .require_wallet(&self.database, user_id, wallet_id)
            .await?;
        Wallet::try_from(model)
    }

    /// Lists the user's wallets ordered by name.
    pub async fn list_wallets(&self, user_id: &str) -> ResultEngine<Vec<Wallet>> {
        wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .order_by_asc(wallets::Column::NameNorm)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Wallet::try_from)
            .collect()
    }

    /// Add a new wallet.
    ///
    /// A non-zero `opening_balance_minor` is recorded as an opening
    /// transaction dated `opened_on`: an income when positive, an expense
    /// when negative.
    pub async fn new_wallet(&self, user_id: &str, cmd: NewWallet) -> ResultEngine<Wallet> {
        let name = normalize_required_name(&cmd.name, "wallet")?;
        let name_norm = name_key(&name)?;
        require_overdraft_limit(cmd.overdraft_limit)?;

        let wallet = with_tx!(self, |db_tx| {
            self.ensure_wallet_name_free(&db_tx, user_id, &name_norm, None)
                .await?;

            let mut wallet = Wallet::new(name.clone(), cmd.kind, cmd.overdraft_limit);
            let mut wallet_model: wallets::ActiveModel = (&wallet).into();
            wallet_model.user_id = ActiveValue::Set(user_id.to_string());
            wallet_model.name_norm = ActiveValue::Set(name_norm.clone());
            wallet_model.insert(&db_tx).await?;

            if cmd.opening_balance_minor != 0 {
                let kind = if cmd.opening_balance_minor > 0 {
                    TransactionKind::Income
                } else {
                    TransactionKind::Expense
                };
                let amount_minor = cmd.opening_balance_minor.checked_abs().ok_or_else(|| {
                    EngineError::InvalidAmount("opening balance out of range".to_string())
                })?;
                let mut opening = Transaction::new(wallet.id, kind, amount_minor, cmd.opened_on)?;
                opening.description = Some(format!("opening balance for wallet '{name}'"));
                let mut tx_model: transactions::ActiveModel = (&opening).into();
                tx_model.user_id = ActiveValue::Set(user_id.to_string());
                tx_model.insert(&db_tx).await?;

                self.write_balance(&db_tx, wallet.id, wallet.version, opening.signed_amount())
                    .await?;
                wallet.balance = opening.signed_amount().cents();
                wallet.version += 1;
            }

            Ok(wallet)
        })?;

        tracing::info!(%user_id, wallet_id = %wallet.id, "wallet created");
        Ok(wallet)
    }

    /// Renames, re-kinds or changes the overdraft limit of a wallet.
    ///
    /// The balance is never touched here.
    pub async fn update_wallet(
        &self,
        user_id: &str,
        wallet_id: Uuid,
        patch: WalletPatch,
    ) -> ResultEngine<Wallet> {
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "wallet"))
            .transpose()?;
        if let Some(limit) = patch.overdraft_limit {
            require_overdraft_limit(limit)?;
        }

        with_tx!(self, |db_tx| {
            let model = self.require_wallet(&db_tx, user_id, wallet_id).await?;
            if patch.is_empty() {
                return Wallet::try_from(model);
            }

            let mut active = wallets::ActiveModel {
                id: ActiveValue::Unchanged(wallet_id),
                ..Default::default()
            };
            if let Some(name) = name {
                let name_norm = name_key(&name)?;
                self.ensure_wallet_name_free(&db_tx, user_id, &name_norm, Some(wallet_id))
                    .await?;
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(name_norm);
            }
            if let Some(kind) = patch.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(limit) = patch.overdraft_limit {
                active.overdraft_limit = ActiveValue::Set(limit);
            }
            let updated = active.update(&db_tx).await?;
            Wallet::try_from(updated)
        })
    }

    /// Deletes a wallet together with its transactions.
    pub async fn delete_wallet(&self, user_id: &str, wallet_id: Uuid) -> ResultEngine<()> {
        let _guard = self.wallet_locks.lock(wallet_id).await;
        with_tx!(self, |db_tx| {
            self.require_wallet(&db_tx, user_id, wallet_id).await?;
            transactions::Entity::delete_many()
                .filter(transactions::Column::WalletId.eq(wallet_id))
                .exec(&db_tx)
                .await?;
            wallets::Entity::delete_by_id(wallet_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })?;
        tracing::info!(%user_id, %wallet_id, "wallet deleted");
        Ok(())
    }

    /// Recomputes a wallet balance from its transactions and stores it.
    ///
    /// The sum is read and written in one DB transaction under the wallet
    /// lock, and the write only lands if the wallet version is still the one
    /// that was read. A lost race is retried once before surfacing
    /// [`EngineError::ConsistencyConflict`]. Calling it twice in a row leaves
    /// the second call with `old_balance == new_balance`.
    pub async fn recompute_wallet_balance(
        &self,
        user_id: &str,
        wallet_id: Uuid,
    ) -> ResultEngine<BalanceRecomputation> {
        let _guard = self.wallet_locks.lock(wallet_id).await;
        let outcome =
            retry_once_on_conflict(wallet_id, || self.recompute_once(user_id, wallet_id)).await?;

        if outcome.corrected() {
            tracing::warn!(
                %user_id,
                %wallet_id,
                old_balance = outcome.old_balance,
                new_balance = outcome.new_balance,
                "wallet balance corrected"
            );
        } else {
            tracing::debug!(%wallet_id, balance = outcome.new_balance, "wallet balance verified");
        }
        Ok(outcome)
    }

    async fn recompute_once(
        &self,
        user_id: &str,
        wallet_id: Uuid,
    ) -> ResultEngine<BalanceRecomputation> {
        with_tx!(self, |db_tx| {
            let wallet = self.require_wallet(&db_tx, user_id, wallet_id).await?;
            let new_balance = wallet_ledger_sum(&db_tx, wallet_id).await?;
            self.write_balance(&db_tx, wallet_id, wallet.version, new_balance)
                .await?;
            Ok(BalanceRecomputation {
                old_balance: wallet.balance,
                new_balance: new_balance.cents(),
            })
        })
    }

    /// Adds `changes` one after the other to the stored balance of a wallet
    /// and writes the result once.
    ///
    /// Every intermediate balance must fit in an `i64`. Callers must hold the
    /// wallet lock.
    pub(super) async fn apply_balance_changes(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        wallet_id: Uuid,
        changes: &[MoneyCents],
    ) -> ResultEngine<()> {
        if changes.iter().all(|change| *change == MoneyCents::ZERO) {
            return Ok(());
        }
        let wallet = self.require_wallet(db_tx, user_id, wallet_id).await?;
        let balance = changes
            .iter()
            .try_fold(MoneyCents::new(wallet.balance), |acc, change| {
                acc.checked_add(*change)
            })
            .ok_or_else(|| EngineError::InvalidAmount("wallet balance overflows".to_string()))?;
        if balance.cents() == wallet.balance {
            return Ok(());
        }
        self.write_balance(db_tx, wallet_id, wallet.version, balance)
            .await
    }

    /// Stores `balance` and bumps the version, provided nobody else changed
    /// the wallet since `expected_version` was read.
    pub(super) async fn write_balance(
        &self,
        db_tx: &DatabaseTransaction,
        wallet_id: Uuid,
        expected_version: i64,
        balance: MoneyCents,
    ) -> ResultEngine<()> {
        let result = wallets::Entity::update_many()
            .col_expr(wallets::Column::Balance, Expr::value(balance.cents()))
            .col_expr(
                wallets::Column::Version,
                Expr::col(wallets::Column::Version).add(1),
            )
            .filter(wallets::Column::Id.eq(wallet_id))
            .filter(wallets::Column::Version.eq(expected_version))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::ConsistencyConflict(format!(
                "wallet {wallet_id} changed while its balance was being written"
            )));
        }
        Ok(())
    }

    async fn ensure_wallet_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        name_norm: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .filter(wallets::Column::NameNorm.eq(name_norm));
        if let Some(wallet_id) = except {
            query = query.filter(wallets::Column::Id.ne(wallet_id));
        }
        if let Some(existing) = query.one(db_tx).await? {
            return Err(EngineError::ExistingKey(existing.name));
        }
        Ok(())
    }
}

/// Runs `attempt` again after a [`EngineError::ConsistencyConflict`]; a
/// second conflict is returned to the caller.
async fn retry_once_on_conflict<T, F, Fut>(wallet_id: Uuid, mut attempt: F) -> ResultEngine<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ResultEngine<T>>,
{
    match attempt().await {
        Err(EngineError::ConsistencyConflict(reason)) => {
            tracing::warn!(%wallet_id, %reason, "balance recomputation lost a race, retrying");
            attempt().await
        }
        other => other,
    }
}

/// Sum of the signed amounts of every transaction of the wallet.
async fn wallet_ledger_sum(db_tx: &DatabaseTransaction, wallet_id: Uuid) -> ResultEngine<MoneyCents> {
    let models = transactions::Entity::find()
        .filter(transactions::Column::WalletId.eq(wallet_id))
        .all(db_tx)
        .await?;
    let mut signed = Vec::with_capacity(models.len());
    for model in models {
        signed.push(Transaction::try_from(model)?.signed_amount());
    }
    MoneyCents::try_sum(signed)
}

fn require_overdraft_limit(limit_minor: i64) -> ResultEngine<()> {
    if limit_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "overdraft limit must be >= 0".to_string(),
        ));
    }
    Ok(())
}
