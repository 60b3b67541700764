use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MembershipOracle, ResultEngine, StoreMembership, groups};

use super::Engine;

impl Engine {
    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
    }

    /// Resolve the group and require `user_id` to be one of its members.
    pub(super) async fn require_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if !StoreMembership::new(db).is_member(group_id, user_id).await? {
            return Err(EngineError::Forbidden(
                "not a member of the group".to_string(),
            ));
        }
        Ok(group)
    }
}
