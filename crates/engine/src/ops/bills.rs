use chrono::NaiveDate;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    BillReminder, BillReminderInput, ResultEngine, Urgency, bills,
    util::{normalize_required_name, require_positive_amount},
};

use super::Engine;

/// A bill reminder with its urgency on the requested day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillReminderView {
    pub reminder: BillReminder,
    pub urgency: Urgency,
}

fn build_reminder(id: Option<Uuid>, input: &BillReminderInput) -> ResultEngine<BillReminder> {
    let name = normalize_required_name(&input.name, "bill reminder")?;
    require_positive_amount(input.amount_minor, "bill amount")?;
    let mut reminder = BillReminder::new(name, input.amount_minor, input.due_on);
    if let Some(id) = id {
        reminder.id = id;
    }
    reminder.paid = input.paid;
    Ok(reminder)
}

impl Engine {
    /// Lists bill reminders by due date, each classified for `as_of`.
    ///
    /// Paid reminders are left out unless `include_paid` is set.
    pub async fn list_bill_reminders(
        &self,
        user_id: &str,
        as_of: NaiveDate,
        include_paid: bool,
    ) -> ResultEngine<Vec<BillReminderView>> {
        let mut query = bills::Entity::find().filter(bills::Column::UserId.eq(user_id));
        if !include_paid {
            query = query.filter(bills::Column::Paid.eq(false));
        }
        let models = query
            .order_by_asc(bills::Column::DueOn)
            .order_by_asc(bills::Column::Id)
            .all(&self.database)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let reminder = BillReminder::from(model);
                let urgency = reminder.urgency(as_of);
                BillReminderView { reminder, urgency }
            })
            .collect())
    }

    pub async fn create_bill_reminder(
        &self,
        user_id: &str,
        input: BillReminderInput,
    ) -> ResultEngine<BillReminder> {
        let reminder = build_reminder(None, &input)?;
        let mut model: bills::ActiveModel = (&reminder).into();
        model.user_id = ActiveValue::Set(user_id.to_string());
        model.insert(&self.database).await?;
        Ok(reminder)
    }

    pub async fn update_bill_reminder(
        &self,
        user_id: &str,
        reminder_id: Uuid,
        input: BillReminderInput,
    ) -> ResultEngine<BillReminder> {
        let reminder = build_reminder(Some(reminder_id), &input)?;
        self.require_bill_reminder(&self.database, user_id, reminder_id)
            .await?;
        let model: bills::ActiveModel = (&reminder).into();
        model.update(&self.database).await?;
        Ok(reminder)
    }

    pub async fn delete_bill_reminder(
        &self,
        user_id: &str,
        reminder_id: Uuid,
    ) -> ResultEngine<()> {
        self.require_bill_reminder(&self.database, user_id, reminder_id)
            .await?;
        bills::Entity::delete_by_id(reminder_id)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
