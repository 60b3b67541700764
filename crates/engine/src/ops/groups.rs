use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    Group, Member, ResultEngine, ValidationError, group_members, groups,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a group. The creator becomes its first member in the same
    /// transaction.
    pub async fn create_group(&self, name: &str, user_id: Uuid) -> ResultEngine<Group> {
        let name = normalize_required_name(name, "group name")?;
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                let group = Group::new(name, user_id, Utc::now());
                groups::ActiveModel::from(&group).insert(&db_tx).await?;
                group_members::ActiveModel {
                    group_id: ActiveValue::Set(group.id),
                    user_id: ActiveValue::Set(user_id),
                    joined_at: ActiveValue::Set(group.created_at),
                }
                .insert(&db_tx)
                .await?;
                info!(group_id = %group.id, created_by = %user_id, "group created");
                Ok(group)
            })
        })
        .await
    }

    /// Return a group visible to `user_id`.
    pub async fn group(&self, group_id: Uuid, user_id: Uuid) -> ResultEngine<Group> {
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                let model = self.require_member(&db_tx, group_id, user_id).await?;
                Ok(Group::from(model))
            })
        })
        .await
    }

    /// Add `member_id` to a group on behalf of an existing member.
    pub async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        member_id: Uuid,
    ) -> ResultEngine<Member> {
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, group_id, user_id).await?;
                let existing = group_members::Entity::find_by_id((group_id, member_id))
                    .one(&db_tx)
                    .await?;
                if existing.is_some() {
                    return Err(ValidationError::AlreadyMember(member_id).into());
                }
                let model = group_members::ActiveModel {
                    group_id: ActiveValue::Set(group_id),
                    user_id: ActiveValue::Set(member_id),
                    joined_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&db_tx)
                .await?;
                info!(%group_id, added_by = %user_id, %member_id, "member added");
                Ok(Member::from(model))
            })
        })
        .await
    }

    /// List the members of a group, oldest first.
    pub async fn members(&self, group_id: Uuid, user_id: Uuid) -> ResultEngine<Vec<Member>> {
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, group_id, user_id).await?;
                let rows = group_members::Entity::find()
                    .filter(group_members::Column::GroupId.eq(group_id))
                    .order_by_asc(group_members::Column::JoinedAt)
                    .order_by_asc(group_members::Column::UserId)
                    .all(&db_tx)
                    .await?;
                Ok(rows.into_iter().map(Member::from).collect())
            })
        })
        .await
    }
}
