//! Group and membership endpoints.

use api_types::{
    group::{GroupNew, GroupView},
    member::{MemberNew, MemberView, MembersResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Actor, ServerError, server::ServerState};

fn group_view(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        created_by: group.created_by,
        created_at: group.created_at,
    }
}

fn member_view(member: engine::Member) -> MemberView {
    MemberView {
        user_id: member.user_id,
        joined_at: member.joined_at,
    }
}

/// Handle requests for creating a new group
pub async fn group_new(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state.engine.create_group(&payload.name, user_id).await?;
    Ok((StatusCode::CREATED, Json(group_view(group))))
}

pub async fn get(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(group_id, user_id).await?;
    Ok(Json(group_view(group)))
}

pub async fn list_members(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .members(group_id, user_id)
        .await?
        .into_iter()
        .map(member_view)
        .collect();

    Ok(Json(MembersResponse { members }))
}

pub async fn add_member(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let member = state
        .engine
        .add_member(group_id, user_id, payload.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(member_view(member))))
}
