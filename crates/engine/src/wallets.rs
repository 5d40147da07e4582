//! The module contains `Wallet` struct and its implementation.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Checking,
    Savings,
    Credit,
    Cash,
    Investment,
}

impl WalletKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Cash => "cash",
            Self::Investment => "investment",
        }
    }
}

impl TryFrom<&str> for WalletKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            "cash" => Ok(Self::Cash),
            "investment" => Ok(Self::Investment),
            other => Err(EngineError::InvalidName(format!(
                "invalid wallet kind: {other}"
            ))),
        }
    }
}

/// A wallet.
///
/// A wallet is a place where money is kept: a bank account, a credit card,
/// cash. Its `balance` is a denormalized sum of its transactions, kept up to
/// date incrementally by every transaction write and rebuilt from scratch by
/// [`Engine::recompute_wallet_balance`](crate::Engine::recompute_wallet_balance).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    /// Stable identifier for this wallet.
    pub id: Uuid,
    pub name: String,
    pub kind: WalletKind,
    pub balance: i64,
    /// How far below zero the balance may go before the wallet is reported
    /// as overdrawn. Writes are never rejected because of it.
    pub overdraft_limit: i64,
    pub version: i64,
}

impl Wallet {
    pub fn new(name: String, kind: WalletKind, overdraft_limit: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind,
            balance: 0,
            overdraft_limit,
            version: 0,
        }
    }

    pub fn balance(&self) -> MoneyCents {
        MoneyCents::new(self.balance)
    }

    /// `true` when the balance sits below `-overdraft_limit`.
    pub fn is_overdrawn(&self) -> bool {
        self.balance < -self.overdraft_limit
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
    pub kind: String,
    pub balance: i64,
    pub overdraft_limit: i64,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            name_norm: ActiveValue::NotSet,
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            balance: ActiveValue::Set(value.balance),
            overdraft_limit: ActiveValue::Set(value.overdraft_limit),
            version: ActiveValue::Set(value.version),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            kind: WalletKind::try_from(model.kind.as_str())?,
            balance: model.balance,
            overdraft_limit: model.overdraft_limit,
            version: model.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdraft_is_reported_not_enforced() {
        let mut wallet = Wallet::new("Card".to_string(), WalletKind::Credit, 50_000);
        wallet.balance = -50_000;
        assert!(!wallet.is_overdrawn());
        wallet.balance = -50_001;
        assert!(wallet.is_overdrawn());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(matches!(
            WalletKind::try_from("piggy_bank"),
            Err(EngineError::InvalidName(_))
        ));
    }
}
