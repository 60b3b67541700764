//! Settlement endpoints

use api_types::{
    ListQuery,
    settlement::{SettlementListResponse, SettlementNew, SettlementView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CreateSettlementCmd, Money, Page};
use uuid::Uuid;

use crate::{Actor, ServerError, server::ServerState};

fn settlement_view(settlement: engine::Settlement) -> SettlementView {
    SettlementView {
        id: settlement.id,
        group_id: settlement.group_id,
        from_user: settlement.from_user,
        to_user: settlement.to_user,
        amount: settlement.amount.to_string(),
        created_at: settlement.created_at,
    }
}

pub async fn settlement_new(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<SettlementNew>,
) -> Result<(StatusCode, Json<SettlementView>), ServerError> {
    let amount: Money = payload.amount.parse()?;
    let settlement = state
        .engine
        .create_settlement(CreateSettlementCmd::new(
            group_id,
            user_id,
            payload.from_user,
            payload.to_user,
            amount,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(settlement_view(settlement))))
}

pub async fn list(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<SettlementListResponse>, ServerError> {
    let page = Page::new(query.limit, query.offset)?;
    let listed = state
        .engine
        .list_settlements(group_id, user_id, page)
        .await?;

    Ok(Json(SettlementListResponse {
        settlements: listed.items.into_iter().map(settlement_view).collect(),
        total: listed.total,
        limit: listed.page.limit,
        offset: listed.page.offset,
    }))
}
