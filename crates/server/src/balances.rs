//! Balance endpoint

use api_types::balance::{BalanceView, BalancesResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{Actor, ServerError, server::ServerState};

/// Net balance of every member of the group, ordered by user id.
pub async fn get(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state
        .engine
        .balances(group_id, user_id)
        .await?
        .into_iter()
        .map(|balance| BalanceView {
            user_id: balance.user_id,
            amount: balance.amount.to_string(),
        })
        .collect();

    Ok(Json(BalancesResponse { group_id, balances }))
}
