use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use crate::{EngineError, NotificationId, ResultEngine, StoredNotification, notifications};

use super::Engine;

impl Engine {
    /// Lists the notifications stored for the user, newest first.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> ResultEngine<Vec<StoredNotification>> {
        let mut query =
            notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(notifications::Column::Read.eq(false));
        }
        query
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(StoredNotification::try_from)
            .collect()
    }

    pub async fn mark_notification_read(
        &self,
        user_id: &str,
        notification_id: NotificationId,
    ) -> ResultEngine<()> {
        notifications::Entity::find_by_id(notification_id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("notification not exists".to_string()))?;

        notifications::ActiveModel {
            id: ActiveValue::Unchanged(notification_id),
            read: ActiveValue::Set(true),
            ..Default::default()
        }
        .update(&self.database)
        .await?;
        Ok(())
    }
}
