//! Bill reminders: upcoming payments classified by how soon they are due.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Urgency, urgency_of};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillReminder {
    pub id: Uuid,
    pub name: String,
    pub amount_minor: i64,
    pub due_on: NaiveDate,
    pub paid: bool,
}

impl BillReminder {
    pub fn new(name: String, amount_minor: i64, due_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            amount_minor,
            due_on,
            paid: false,
        }
    }

    pub fn urgency(&self, as_of: NaiveDate) -> Urgency {
        urgency_of(self.due_on, as_of)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bill_reminders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub due_on: Date,
    pub paid: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BillReminder {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            amount_minor: model.amount_minor,
            due_on: model.due_on,
            paid: model.paid,
        }
    }
}

impl From<&BillReminder> for ActiveModel {
    fn from(value: &BillReminder) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            due_on: ActiveValue::Set(value.due_on),
            paid: ActiveValue::Set(value.paid),
        }
    }
}
