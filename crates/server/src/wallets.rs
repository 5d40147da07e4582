//! Wallets API endpoints

use api_types::wallet::{
    BalanceRecalculated, WalletKind as ApiKind, WalletNew, WalletUpdate, WalletView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, today};

fn map_kind(kind: engine::WalletKind) -> ApiKind {
    match kind {
        engine::WalletKind::Checking => ApiKind::Checking,
        engine::WalletKind::Savings => ApiKind::Savings,
        engine::WalletKind::Credit => ApiKind::Credit,
        engine::WalletKind::Cash => ApiKind::Cash,
        engine::WalletKind::Investment => ApiKind::Investment,
    }
}

fn engine_kind(kind: ApiKind) -> engine::WalletKind {
    match kind {
        ApiKind::Checking => engine::WalletKind::Checking,
        ApiKind::Savings => engine::WalletKind::Savings,
        ApiKind::Credit => engine::WalletKind::Credit,
        ApiKind::Cash => engine::WalletKind::Cash,
        ApiKind::Investment => engine::WalletKind::Investment,
    }
}

fn view(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        overdrawn: wallet.is_overdrawn(),
        kind: map_kind(wallet.kind),
        balance_minor: wallet.balance,
        overdraft_limit: wallet.overdraft_limit,
        version: wallet.version,
        name: wallet.name,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state.engine.list_wallets(&user.username).await?;
    Ok(Json(wallets.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(&user.username, id).await?;
    Ok(Json(view(wallet)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let cmd = engine::NewWallet::new(
        payload.name,
        engine_kind(payload.kind),
        payload.opened_on.unwrap_or_else(today),
    )
    .overdraft_limit(payload.overdraft_limit.unwrap_or(0))
    .opening_balance(payload.opening_balance_minor.unwrap_or(0));

    let wallet = state.engine.new_wallet(&user.username, cmd).await?;
    Ok((StatusCode::CREATED, Json(view(wallet))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WalletUpdate>,
) -> Result<Json<WalletView>, ServerError> {
    let patch = engine::WalletPatch {
        name: payload.name,
        kind: payload.kind.map(engine_kind),
        overdraft_limit: payload.overdraft_limit,
    };
    let wallet = state
        .engine
        .update_wallet(&user.username, id, patch)
        .await?;
    Ok(Json(view(wallet)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_wallet(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rebuilds the stored balance from the wallet's transactions.
pub async fn recalculate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceRecalculated>, ServerError> {
    let outcome = state
        .engine
        .recompute_wallet_balance(&user.username, id)
        .await?;
    Ok(Json(BalanceRecalculated {
        wallet_id: id,
        old_balance: outcome.old_balance,
        new_balance: outcome.new_balance,
        corrected: outcome.corrected(),
    }))
}
