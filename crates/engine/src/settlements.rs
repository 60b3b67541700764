//! Settlements.
//!
//! A [`Settlement`] is a direct payment from one member to another. It is an
//! immutable fact: it moves obligation between the two parties and never
//! edits a stored balance.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub group_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub(crate) fn new(
        group_id: Uuid,
        from_user: Uuid,
        to_user: Uuid,
        amount: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            from_user,
            to_user,
            amount,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Settlement> for ActiveModel {
    type Error = EngineError;

    fn try_from(settlement: &Settlement) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(settlement.id),
            group_id: ActiveValue::Set(settlement.group_id),
            from_user: ActiveValue::Set(settlement.from_user),
            to_user: ActiveValue::Set(settlement.to_user),
            amount_minor: ActiveValue::Set(settlement.amount.minor_units()?),
            created_at: ActiveValue::Set(settlement.created_at),
        })
    }
}

impl From<Model> for Settlement {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            from_user: model.from_user,
            to_user: model.to_user,
            amount: Money::from_minor(model.amount_minor),
            created_at: model.created_at,
        }
    }
}
