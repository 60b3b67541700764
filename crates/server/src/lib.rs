use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, ValidationError};

pub use rate_limit::RateLimiter;
pub use server::{Actor, ServerState, UserIdHeader, router, run, run_with_listener};

mod balances;
mod expenses;
mod groups;
mod health;
mod rate_limit;
mod server;
mod settlements;

pub mod types {
    pub mod group {
        pub use api_types::group::{GroupNew, GroupView};
        pub use api_types::member::{MemberNew, MemberView, MembersResponse};
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseListResponse, ExpenseNew, ExpenseView, SplitNew, SplitView,
        };
    }

    pub mod settlement {
        pub use api_types::settlement::{SettlementListResponse, SettlementNew, SettlementView};
    }

    pub mod balance {
        pub use api_types::balance::{BalanceView, BalancesResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Transient(reason) => {
            tracing::warn!("transient failure: {reason}");
            "temporarily unavailable, retry the request".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<ValidationError> for ServerError {
    fn from(value: ValidationError) -> Self {
        Self::Engine(value.into())
    }
}
