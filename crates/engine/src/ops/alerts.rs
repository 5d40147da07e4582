use chrono::Utc;
use sea_orm::{ActiveValue, EntityTrait, sea_query::OnConflict};

use crate::{
    AlertTier, Budget, BudgetSnapshot, EngineError, Notification, ResultEngine,
    alerts::alert_text, alert_states, next_alert,
};

use super::Engine;

impl Engine {
    /// Notifies the user when a budget snapshot crossed into a higher alert
    /// tier than the one already notified for its period.
    ///
    /// At most one notification per tier is sent for a given
    /// `(budget, period)`, and tiers never go back down within a period: a
    /// new period starts from scratch. Evaluations for the same budget and
    /// period run one at a time.
    ///
    /// The notification is handed to the sink before the tier is recorded.
    /// If the sink fails, [`EngineError::Notification`] is returned and the
    /// tier stays where it was, so the next evaluation tries again.
    pub async fn evaluate_alert(
        &self,
        user_id: &str,
        budget: &Budget,
        snapshot: &BudgetSnapshot,
    ) -> ResultEngine<Option<Notification>> {
        let key = (budget.id, snapshot.period_index);
        let _guard = self.alert_locks.lock(key).await;

        let recorded = alert_states::Entity::find_by_id(key)
            .one(&self.database)
            .await?;
        let last_notified = recorded
            .map(|state| AlertTier::try_from(state.tier.as_str()))
            .transpose()?;
        let Some(tier) = next_alert(last_notified, snapshot.status) else {
            return Ok(None);
        };

        let kind = tier.notification_kind();
        let message = alert_text(&budget.name, tier, snapshot);
        let id = self
            .notifier
            .create_notification(user_id, kind, &message)
            .await
            .map_err(|err| match err {
                EngineError::Notification(_) => err,
                other => EngineError::Notification(other.to_string()),
            })?;

        let state = alert_states::ActiveModel {
            budget_id: ActiveValue::Set(budget.id),
            period_index: ActiveValue::Set(snapshot.period_index),
            tier: ActiveValue::Set(tier.as_str().to_string()),
            notified_at: ActiveValue::Set(Utc::now()),
        };
        alert_states::Entity::insert(state)
            .on_conflict(
                OnConflict::columns([
                    alert_states::Column::BudgetId,
                    alert_states::Column::PeriodIndex,
                ])
                .update_columns([alert_states::Column::Tier, alert_states::Column::NotifiedAt])
                .to_owned(),
            )
            .exec(&self.database)
            .await?;

        tracing::info!(
            %user_id,
            budget_id = %budget.id,
            period_index = snapshot.period_index,
            tier = tier.as_str(),
            percentage = snapshot.percentage,
            "budget alert sent"
        );
        Ok(Some(Notification {
            id,
            user_id: user_id.to_string(),
            kind,
            message,
        }))
    }
}
