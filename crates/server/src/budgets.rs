//! Budgets API endpoints
//!
//! Reading budgets is what drives alerts: every `GET` computes the
//! snapshot for `asOf` (today by default) and hands it to the evaluator.

use api_types::budget::{
    AsOf, BudgetInput, BudgetPeriod as ApiPeriod, BudgetSnapshotView, BudgetStatus as ApiStatus,
    BudgetView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, today};

fn map_period(period: engine::BudgetPeriod) -> ApiPeriod {
    match period {
        engine::BudgetPeriod::Month => ApiPeriod::Month,
        engine::BudgetPeriod::Year => ApiPeriod::Year,
    }
}

fn map_status(status: engine::BudgetStatus) -> ApiStatus {
    match status {
        engine::BudgetStatus::Good => ApiStatus::Good,
        engine::BudgetStatus::Half => ApiStatus::Half,
        engine::BudgetStatus::Warning => ApiStatus::Warning,
        engine::BudgetStatus::Exceeded => ApiStatus::Exceeded,
    }
}

fn input(payload: BudgetInput) -> engine::BudgetInput {
    engine::BudgetInput {
        name: payload.name,
        amount_minor: payload.amount_minor,
        category_id: payload.category_id,
        period: match payload.period {
            ApiPeriod::Month => engine::BudgetPeriod::Month,
            ApiPeriod::Year => engine::BudgetPeriod::Year,
        },
        start_date: payload.start_date,
        alert_threshold: payload.alert_threshold,
    }
}

fn snapshot_view(snapshot: engine::BudgetSnapshot) -> BudgetSnapshotView {
    BudgetSnapshotView {
        period_start: snapshot.window.start,
        period_end: snapshot.window.end,
        spent: snapshot.spent,
        remaining: snapshot.remaining,
        percentage: snapshot.percentage,
        status: map_status(snapshot.status),
        days_remaining: snapshot.days_remaining,
        alert_message: snapshot.alert_message,
    }
}

fn view(item: engine::BudgetWithSnapshot) -> BudgetView {
    let engine::BudgetWithSnapshot { budget, snapshot } = item;
    BudgetView {
        id: budget.id,
        name: budget.name,
        amount_minor: budget.amount_minor,
        category_id: budget.category_id,
        period: map_period(budget.period),
        start_date: budget.start_date,
        alert_threshold: budget.alert_threshold,
        snapshot: snapshot_view(snapshot),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<AsOf>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let budgets = state.engine.list_budgets(&user.username, as_of).await?;
    Ok(Json(budgets.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AsOf>,
) -> Result<Json<BudgetView>, ServerError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let budget = state
        .engine
        .budget_with_snapshot(&user.username, id, as_of)
        .await?;
    Ok(Json(view(budget)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetInput>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let created = state
        .engine
        .create_budget(&user.username, input(payload))
        .await?;
    let budget = state
        .engine
        .budget_with_snapshot(&user.username, created.id, today())
        .await?;
    Ok((StatusCode::CREATED, Json(view(budget))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetInput>,
) -> Result<Json<BudgetView>, ServerError> {
    state
        .engine
        .update_budget(&user.username, id, input(payload))
        .await?;
    let budget = state
        .engine
        .budget_with_snapshot(&user.username, id, today())
        .await?;
    Ok(Json(view(budget)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
