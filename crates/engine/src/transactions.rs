//! Transaction primitives.
//!
//! A `Transaction` moves money in or out of exactly one wallet. Amounts are
//! always positive; the [`TransactionKind`] gives the sign of the balance
//! change.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::require_positive_amount};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Signed contribution of `amount_minor` to the wallet balance.
    pub fn signed(self, amount_minor: i64) -> MoneyCents {
        match self {
            Self::Income => MoneyCents::new(amount_minor),
            Self::Expense => -MoneyCents::new(amount_minor),
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub occurred_on: NaiveDate,
    pub description: Option<String>,
}

impl Transaction {
    pub fn new(
        wallet_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_on: NaiveDate,
    ) -> ResultEngine<Self> {
        require_positive_amount(amount_minor, "amount_minor")?;
        Ok(Self {
            id: Uuid::new_v4(),
            wallet_id,
            category_id: None,
            kind,
            amount_minor,
            occurred_on,
            description: None,
        })
    }

    pub fn signed_amount(&self) -> MoneyCents {
        self.kind.signed(self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub wallet_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: String,
    pub amount_minor: i64,
    pub occurred_on: Date,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallet,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::NotSet,
            wallet_id: ActiveValue::Set(tx.wallet_id),
            category_id: ActiveValue::Set(tx.category_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            description: ActiveValue::Set(tx.description.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            wallet_id: model.wallet_id,
            category_id: model.category_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            occurred_on: model.occurred_on,
            description: model.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_is_negative() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let tx = Transaction::new(Uuid::new_v4(), TransactionKind::Expense, 200, day).unwrap();
        assert_eq!(tx.signed_amount(), MoneyCents::new(-200));
        assert_eq!(TransactionKind::Income.signed(1000), MoneyCents::new(1000));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        for amount in [0, -5] {
            assert!(matches!(
                Transaction::new(Uuid::new_v4(), TransactionKind::Income, amount, day),
                Err(EngineError::InvalidAmount(_))
            ));
        }
    }
}
