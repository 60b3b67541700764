use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    CreateSettlementCmd, EngineError, MembershipOracle, Page, Paged, ResultEngine, Settlement,
    StoreMembership, ValidationError, settlements,
};

use super::{Engine, with_tx};

fn validate_settlement(cmd: &CreateSettlementCmd) -> Result<(), ValidationError> {
    if cmd.from_user == cmd.to_user {
        return Err(ValidationError::SelfSettlement);
    }
    if !cmd.amount.is_positive() {
        return Err(ValidationError::NonPositiveSettlement);
    }
    Ok(())
}

impl Engine {
    /// Record a payment from `from_user` to `to_user`.
    ///
    /// Both parties must be distinct members of the group. Nothing is written
    /// unless every check passes.
    pub async fn create_settlement(&self, cmd: CreateSettlementCmd) -> ResultEngine<Settlement> {
        debug!(group_id = %cmd.group_id, user_id = %cmd.user_id, "validating settlement");
        validate_settlement(&cmd).inspect_err(|err| {
            debug!(group_id = %cmd.group_id, error = %err, "settlement rejected");
        })?;

        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, cmd.group_id, cmd.user_id)
                    .await?;
                let oracle = StoreMembership::new(&db_tx);
                for party in [cmd.from_user, cmd.to_user] {
                    if !oracle.is_member(cmd.group_id, party).await? {
                        return Err(ValidationError::NonMember(party).into());
                    }
                }

                let settlement = Settlement::new(
                    cmd.group_id,
                    cmd.from_user,
                    cmd.to_user,
                    cmd.amount,
                    Utc::now(),
                );
                settlements::ActiveModel::try_from(&settlement)?
                    .insert(&db_tx)
                    .await?;
                info!(
                    settlement_id = %settlement.id,
                    group_id = %settlement.group_id,
                    from_user = %settlement.from_user,
                    to_user = %settlement.to_user,
                    amount = %settlement.amount,
                    "settlement recorded"
                );
                Ok(settlement)
            })
        })
        .await
        .inspect_err(|err| {
            if matches!(err, EngineError::Conflict(_)) {
                warn!(group_id = %cmd.group_id, error = %err, "settlement refused by the store");
            }
        })
    }

    /// List the settlements of a group, newest first.
    pub async fn list_settlements(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        page: Page,
    ) -> ResultEngine<Paged<Settlement>> {
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, group_id, user_id).await?;
                let query =
                    settlements::Entity::find().filter(settlements::Column::GroupId.eq(group_id));
                let total = query.clone().count(&db_tx).await?;
                let items = query
                    .order_by_desc(settlements::Column::CreatedAt)
                    .order_by_desc(settlements::Column::Id)
                    .limit(page.limit)
                    .offset(page.offset)
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(Settlement::from)
                    .collect();
                Ok(Paged { items, total, page })
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;

    fn cmd(from_user: Uuid, to_user: Uuid, minor: i64) -> CreateSettlementCmd {
        CreateSettlementCmd::new(Uuid::new_v4(), from_user, from_user, to_user, Money::from_minor(minor))
    }

    #[test]
    fn self_settlement_is_rejected() {
        let a = Uuid::new_v4();
        assert_eq!(
            validate_settlement(&cmd(a, a, 100)).unwrap_err(),
            ValidationError::SelfSettlement
        );
    }

    #[test]
    fn amount_must_be_positive() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            validate_settlement(&cmd(a, b, 0)).unwrap_err(),
            ValidationError::NonPositiveSettlement
        );
        assert_eq!(
            validate_settlement(&cmd(a, b, -5)).unwrap_err(),
            ValidationError::NonPositiveSettlement
        );
        assert!(validate_settlement(&cmd(a, b, 1)).is_ok());
    }
}
