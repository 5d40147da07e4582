use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{NaiveDate, Utc};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod budgets;
mod categories;
mod notifications;
mod reminders;
mod server;
mod transactions;
mod wallets;

pub mod types {
    pub mod wallet {
        pub use api_types::wallet::{
            BalanceRecalculated, WalletKind, WalletNew, WalletUpdate, WalletView,
        };
    }

    pub mod category {
        pub use api_types::category::{CategoryInput, CategoryKind, CategoryView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionInput, TransactionKind, TransactionList, TransactionView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{
            AsOf, BudgetInput, BudgetPeriod, BudgetSnapshotView, BudgetStatus, BudgetView,
        };
    }

    pub mod notification {
        pub use api_types::notification::{NotificationKind, NotificationList, NotificationView};
    }

    pub mod reminder {
        pub use api_types::reminder::{ReminderInput, ReminderList, ReminderView, Urgency};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::InUse(_)
        | EngineError::ConsistencyConflict(_) => StatusCode::CONFLICT,
        EngineError::Notification(_) => StatusCode::BAD_GATEWAY,
        EngineError::Database(_) if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidPeriod(_)
        | EngineError::InvalidThreshold(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Day used when a request does not say which one it is asking about.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        for err in [
            EngineError::ExistingKey("x".to_string()),
            EngineError::InUse("x".to_string()),
            EngineError::ConsistencyConflict("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res =
            ServerError::from(EngineError::InvalidThreshold("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn refused_notification_maps_to_502() {
        let res = ServerError::from(EngineError::Notification("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn locked_database_maps_to_503() {
        let err = EngineError::Database(DbErr::Custom("database is locked".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = EngineError::Database(DbErr::Custom("disk I/O error".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
