//! Membership lookups.
//!
//! The ledger never manages membership itself; it only asks whether a user
//! belongs to a group. [`MembershipOracle`] is that question, and
//! [`StoreMembership`] answers it from the `group_members` table on whatever
//! connection (usually the open write transaction) it is given.

use std::future::Future;

use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::{ResultEngine, group_members};

/// Answers "is `user_id` a member of `group_id`?".
pub trait MembershipOracle {
    fn is_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = ResultEngine<bool>> + Send;
}

/// Membership oracle backed by the store.
pub struct StoreMembership<'a, C> {
    db: &'a C,
}

impl<'a, C> StoreMembership<'a, C>
where
    C: ConnectionTrait,
{
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }
}

impl<C> MembershipOracle for StoreMembership<'_, C>
where
    C: ConnectionTrait,
{
    async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
        let row = group_members::Entity::find_by_id((group_id, user_id))
            .one(self.db)
            .await?;
        Ok(row.is_some())
    }
}
