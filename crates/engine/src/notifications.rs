//! Notifications emitted by the engine.
//!
//! The engine does not deliver anything itself. It hands each alert to a
//! [`NotificationSink`]; whatever pushes, emails or lists notifications sits
//! behind that trait. [`DbNotificationSink`] is the default sink and stores
//! rows in the `notifications` table so clients can list them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseConnection, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub type NotificationId = Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BudgetHalf,
    BudgetAlert,
    BudgetExceeded,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BudgetHalf => "budget_half",
            Self::BudgetAlert => "budget_alert",
            Self::BudgetExceeded => "budget_exceeded",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "budget_half" => Ok(Self::BudgetHalf),
            "budget_alert" => Ok(Self::BudgetAlert),
            "budget_exceeded" => Ok(Self::BudgetExceeded),
            other => Err(EngineError::InvalidName(format!(
                "invalid notification kind: {other}"
            ))),
        }
    }
}

/// A notification accepted by a sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
}

/// Receiver of engine notifications.
///
/// Returning an error means the notification was **not** accepted; the
/// engine will not record it as sent and will try again on the next
/// evaluation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create_notification(
        &self,
        user_id: &str,
        kind: NotificationKind,
        message: &str,
    ) -> ResultEngine<NotificationId>;
}

/// Stores notifications in the `notifications` table.
#[derive(Clone, Debug)]
pub struct DbNotificationSink {
    database: DatabaseConnection,
}

impl DbNotificationSink {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl NotificationSink for DbNotificationSink {
    async fn create_notification(
        &self,
        user_id: &str,
        kind: NotificationKind,
        message: &str,
    ) -> ResultEngine<NotificationId> {
        let id = Uuid::new_v4();
        let active = ActiveModel {
            id: ActiveValue::Set(id),
            user_id: ActiveValue::Set(user_id.to_string()),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            message: ActiveValue::Set(message.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            read: ActiveValue::Set(false),
        };
        active
            .insert(&self.database)
            .await
            .map_err(|err| EngineError::Notification(err.to_string()))?;
        Ok(id)
    }
}

/// A stored notification, as listed back to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredNotification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub kind: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for StoredNotification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            message: model.message,
            created_at: model.created_at,
            read: model.read,
        })
    }
}
