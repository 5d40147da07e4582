//! Budgets: spending limits over a recurring period.
//!
//! A budget only stores its definition. How much of it has been consumed is
//! never persisted, it is derived from transactions on every read (see
//! [`BudgetSnapshot`](crate::BudgetSnapshot)).

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BudgetPeriod, EngineError, ResultEngine, util::require_positive_amount};

/// Alert threshold used when a budget does not specify one.
pub const DEFAULT_ALERT_THRESHOLD: i32 = 80;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub amount_minor: i64,
    /// `None` tracks expenses of every category.
    pub category_id: Option<Uuid>,
    pub period: BudgetPeriod,
    /// Anchor date of the budget periods.
    pub start_date: NaiveDate,
    /// Percentage of `amount_minor` at which the budget turns to `warning`.
    pub alert_threshold: i32,
}

impl Budget {
    pub fn new(
        name: String,
        amount_minor: i64,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            amount_minor,
            category_id: None,
            period,
            start_date,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }

    /// Checks the write-time invariants of a budget definition.
    pub fn validate(&self) -> ResultEngine<()> {
        require_positive_amount(self.amount_minor, "budget amount")?;
        validate_alert_threshold(self.alert_threshold)
    }
}

/// `0` is accepted and puts the budget in `warning` from the start of every
/// period.
pub(crate) fn validate_alert_threshold(threshold: i32) -> ResultEngine<()> {
    if !(0..=100).contains(&threshold) {
        return Err(EngineError::InvalidThreshold(format!(
            "alert threshold must be between 0 and 100, got {threshold}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub category_id: Option<Uuid>,
    pub period: String,
    pub start_date: Date,
    pub alert_threshold: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::alert_states::Entity")]
    AlertStates,
}

impl Related<super::alert_states::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertStates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            category_id: ActiveValue::Set(value.category_id),
            period: ActiveValue::Set(value.period.as_str().to_string()),
            start_date: ActiveValue::Set(value.start_date),
            alert_threshold: ActiveValue::Set(value.alert_threshold),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            amount_minor: model.amount_minor,
            category_id: model.category_id,
            period: BudgetPeriod::try_from(model.period.as_str())?,
            start_date: model.start_date,
            alert_threshold: model.alert_threshold,
        })
    }
}
