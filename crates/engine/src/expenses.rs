//! Expenses.
//!
//! An [`Expense`] records that one member paid `total_amount` on behalf of
//! the group. How that total is apportioned is described by its
//! [`ExpenseSplit`]s; an expense and its splits are written together and never
//! change afterwards.
//!
//! Amounts are stored as integer **minor units** (`*_minor` columns) and
//! surfaced as [`Money`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, expense_splits::ExpenseSplit};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub total_amount: Money,
    pub paid_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub splits: Vec<ExpenseSplit>,
}

impl Expense {
    pub(crate) fn new(
        group_id: Uuid,
        description: String,
        total_amount: Money,
        paid_by: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            description,
            total_amount,
            paid_by,
            created_at,
            splits: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub total_amount_minor: i64,
    pub paid_by: Uuid,
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
    #[sea_orm(has_many = "super::expense_splits::Entity")]
    ExpenseSplits,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseSplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Expense> for ActiveModel {
    type Error = EngineError;

    fn try_from(expense: &Expense) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(expense.id),
            group_id: ActiveValue::Set(expense.group_id),
            description: ActiveValue::Set(expense.description.clone()),
            total_amount_minor: ActiveValue::Set(expense.total_amount.minor_units()?),
            paid_by: ActiveValue::Set(expense.paid_by),
            created_at: ActiveValue::Set(expense.created_at),
        })
    }
}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            description: model.description,
            total_amount: Money::from_minor(model.total_amount_minor),
            paid_by: model.paid_by,
            created_at: model.created_at,
            splits: Vec::new(),
        }
    }
}
