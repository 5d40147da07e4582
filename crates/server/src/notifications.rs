//! Notifications API endpoints

use api_types::notification::{NotificationKind as ApiKind, NotificationList, NotificationView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::NotificationKind) -> ApiKind {
    match kind {
        engine::NotificationKind::BudgetHalf => ApiKind::BudgetHalf,
        engine::NotificationKind::BudgetAlert => ApiKind::BudgetAlert,
        engine::NotificationKind::BudgetExceeded => ApiKind::BudgetExceeded,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<NotificationList>,
) -> Result<Json<Vec<NotificationView>>, ServerError> {
    let notifications = state
        .engine
        .list_notifications(&user.username, query.unread_only.unwrap_or(false))
        .await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(|n| NotificationView {
                id: n.id,
                kind: map_kind(n.kind),
                message: n.message,
                created_at: n.created_at,
                read: n.read,
            })
            .collect(),
    ))
}

pub async fn mark_read(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .mark_notification_read(&user.username, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
