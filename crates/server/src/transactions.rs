//! Transactions API endpoints

use api_types::transaction::{
    TransactionInput, TransactionKind as ApiKind, TransactionList, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
    }
}

fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
    }
}

fn input(payload: TransactionInput) -> engine::TransactionInput {
    engine::TransactionInput {
        wallet_id: payload.wallet_id,
        kind: engine_kind(payload.kind),
        amount_minor: payload.amount_minor,
        occurred_on: payload.occurred_on,
        category_id: payload.category_id,
        description: payload.description,
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        wallet_id: tx.wallet_id,
        category_id: tx.category_id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        occurred_on: tx.occurred_on,
        description: tx.description,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let filter = engine::TransactionListFilter {
        wallet_id: query.wallet_id,
        category_id: query.category_id,
        kind: query.kind.map(engine_kind),
        from: query.from,
        to: query.to,
        limit: query.limit,
    };
    let txs = state
        .engine
        .list_transactions(&user.username, &filter)
        .await?;
    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(&user.username, id).await?;
    Ok(Json(view(tx)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionInput>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .create_transaction(&user.username, input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionInput>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(&user.username, id, input(payload))
        .await?;
    Ok(Json(view(tx)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
