//! Categories API endpoints

use api_types::category::{CategoryInput, CategoryKind as ApiKind, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::CategoryKind) -> ApiKind {
    match kind {
        engine::CategoryKind::Income => ApiKind::Income,
        engine::CategoryKind::Expense => ApiKind::Expense,
    }
}

fn input(payload: CategoryInput) -> engine::CategoryInput {
    engine::CategoryInput {
        name: payload.name,
        kind: match payload.kind {
            ApiKind::Income => engine::CategoryKind::Income,
            ApiKind::Expense => engine::CategoryKind::Expense,
        },
    }
}

fn view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind(category.kind),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_categories(&user.username).await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(&user.username, id).await?;
    Ok(Json(view(category)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(&user.username, input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryInput>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(&user.username, id, input(payload))
        .await?;
    Ok(Json(view(category)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
