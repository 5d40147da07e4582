//! Bill reminders API endpoints

use api_types::reminder::{ReminderInput, ReminderList, ReminderView, Urgency};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, today};

fn map_tier(tier: engine::UrgencyTier) -> Urgency {
    match tier {
        engine::UrgencyTier::Overdue => Urgency::Overdue,
        engine::UrgencyTier::Urgent => Urgency::Urgent,
        engine::UrgencyTier::Upcoming => Urgency::Upcoming,
    }
}

fn input(payload: ReminderInput) -> engine::BillReminderInput {
    engine::BillReminderInput {
        name: payload.name,
        amount_minor: payload.amount_minor,
        due_on: payload.due_on,
        paid: payload.paid,
    }
}

fn view(reminder: engine::BillReminder, urgency: engine::Urgency) -> ReminderView {
    ReminderView {
        id: reminder.id,
        name: reminder.name,
        amount_minor: reminder.amount_minor,
        due_on: reminder.due_on,
        paid: reminder.paid,
        urgency: map_tier(urgency.tier),
        days_until: urgency.days_until,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ReminderList>,
) -> Result<Json<Vec<ReminderView>>, ServerError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let reminders = state
        .engine
        .list_bill_reminders(&user.username, as_of, query.include_paid.unwrap_or(false))
        .await?;
    Ok(Json(
        reminders
            .into_iter()
            .map(|item| view(item.reminder, item.urgency))
            .collect(),
    ))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ReminderInput>,
) -> Result<(StatusCode, Json<ReminderView>), ServerError> {
    let reminder = state
        .engine
        .create_bill_reminder(&user.username, input(payload))
        .await?;
    let urgency = reminder.urgency(today());
    Ok((StatusCode::CREATED, Json(view(reminder, urgency))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReminderInput>,
) -> Result<Json<ReminderView>, ServerError> {
    let reminder = state
        .engine
        .update_bill_reminder(&user.username, id, input(payload))
        .await?;
    let urgency = reminder.urgency(today());
    Ok(Json(view(reminder, urgency)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_bill_reminder(&user.username, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
