use chrono::NaiveDate;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, BudgetInput, BudgetSnapshot, DEFAULT_ALERT_THRESHOLD, ResultEngine, alert_states,
    budgets, util::normalize_required_name, window_for,
};

use super::{Engine, with_tx};

/// A budget together with its consumption for the requested day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetWithSnapshot {
    pub budget: Budget,
    pub snapshot: BudgetSnapshot,
}

fn build_budget(id: Option<Uuid>, input: &BudgetInput) -> ResultEngine<Budget> {
    let name = normalize_required_name(&input.name, "budget")?;
    let mut budget = Budget::new(name, input.amount_minor, input.period, input.start_date);
    if let Some(id) = id {
        budget.id = id;
    }
    budget.category_id = input.category_id;
    budget.alert_threshold = input.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD);
    budget.validate()?;
    Ok(budget)
}

/// `true` when the change can move the budget to another status.
fn changes_consumption(before: &Budget, after: &Budget) -> bool {
    before.amount_minor != after.amount_minor
        || before.category_id != after.category_id
        || before.period != after.period
        || before.start_date != after.start_date
        || before.alert_threshold != after.alert_threshold
}

impl Engine {
    pub async fn budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<Budget> {
        let model = self
            .require_budget(&self.database, user_id, budget_id)
            .await?;
        Budget::try_from(model)
    }

    /// Creates a budget.
    ///
    /// The amount must be positive and the alert threshold (default 80)
    /// within `0..=100`. A category, when given, must belong to the user.
    pub async fn create_budget(&self, user_id: &str, input: BudgetInput) -> ResultEngine<Budget> {
        let budget = build_budget(None, &input)?;

        with_tx!(self, |db_tx| {
            self.require_optional_category(&db_tx, user_id, budget.category_id)
                .await?;
            let mut model: budgets::ActiveModel = (&budget).into();
            model.user_id = ActiveValue::Set(user_id.to_string());
            model.insert(&db_tx).await?;
            Ok(())
        })?;

        tracing::info!(%user_id, budget_id = %budget.id, "budget created");
        Ok(budget)
    }

    /// Replaces a budget definition.
    ///
    /// Any change other than the name forgets which alerts were already
    /// sent, so the evaluator starts again from the new status.
    pub async fn update_budget(
        &self,
        user_id: &str,
        budget_id: Uuid,
        input: BudgetInput,
    ) -> ResultEngine<Budget> {
        let updated = build_budget(Some(budget_id), &input)?;

        with_tx!(self, |db_tx| {
            let current =
                Budget::try_from(self.require_budget(&db_tx, user_id, budget_id).await?)?;
            self.require_optional_category(&db_tx, user_id, updated.category_id)
                .await?;

            let model: budgets::ActiveModel = (&updated).into();
            model.update(&db_tx).await?;

            if changes_consumption(&current, &updated) {
                alert_states::Entity::delete_many()
                    .filter(alert_states::Column::BudgetId.eq(budget_id))
                    .exec(&db_tx)
                    .await?;
            }
            Ok(())
        })?;

        tracing::info!(%user_id, %budget_id, "budget updated");
        Ok(updated)
    }

    pub async fn delete_budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            alert_states::Entity::delete_many()
                .filter(alert_states::Column::BudgetId.eq(budget_id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_by_id(budget_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })?;

        tracing::info!(%user_id, %budget_id, "budget deleted");
        Ok(())
    }

    /// Computes the consumption of a budget for the period containing
    /// `as_of`. Read only: no alert is evaluated.
    pub async fn budget_snapshot(
        &self,
        user_id: &str,
        budget_id: Uuid,
        as_of: NaiveDate,
    ) -> ResultEngine<BudgetSnapshot> {
        let budget = self.budget(user_id, budget_id).await?;
        self.snapshot_for(user_id, &budget, as_of).await
    }

    /// Returns one budget with its snapshot and runs the alert evaluator on
    /// it.
    pub async fn budget_with_snapshot(
        &self,
        user_id: &str,
        budget_id: Uuid,
        as_of: NaiveDate,
    ) -> ResultEngine<BudgetWithSnapshot> {
        let budget = self.budget(user_id, budget_id).await?;
        let snapshot = self.snapshot_for(user_id, &budget, as_of).await?;
        self.evaluate_alert_logged(user_id, &budget, &snapshot)
            .await;
        Ok(BudgetWithSnapshot { budget, snapshot })
    }

    /// Lists the user's budgets with their snapshots for `as_of`.
    ///
    /// Each snapshot is passed to the alert evaluator. A failing evaluation
    /// is logged and does not fail the listing.
    pub async fn list_budgets(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> ResultEngine<Vec<BudgetWithSnapshot>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::Name)
            .order_by_asc(budgets::Column::Id)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let budget = Budget::try_from(model)?;
            let snapshot = self.snapshot_for(user_id, &budget, as_of).await?;
            self.evaluate_alert_logged(user_id, &budget, &snapshot)
                .await;
            out.push(BudgetWithSnapshot { budget, snapshot });
        }
        Ok(out)
    }

    async fn snapshot_for(
        &self,
        user_id: &str,
        budget: &Budget,
        as_of: NaiveDate,
    ) -> ResultEngine<BudgetSnapshot> {
        let window = window_for(budget.period, self.alignment, budget.start_date, as_of)?;
        let spent = self
            .sum_expenses(user_id, budget.category_id, window.start, window.end)
            .await?;
        Ok(BudgetSnapshot::compute(budget, window, spent, as_of))
    }

    async fn evaluate_alert_logged(
        &self,
        user_id: &str,
        budget: &Budget,
        snapshot: &BudgetSnapshot,
    ) {
        if let Err(err) = self.evaluate_alert(user_id, budget, snapshot).await {
            tracing::warn!(
                %user_id,
                budget_id = %budget.id,
                period_index = snapshot.period_index,
                error = %err,
                "budget alert evaluation failed"
            );
        }
    }
}
