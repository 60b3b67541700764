//! Expense splits.
//!
//! One row per participant of an expense, unique on `(expense_id, user_id)`.
//! For every expense the split amounts sum exactly to its total.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&ExpenseSplit> for ActiveModel {
    type Error = EngineError;

    fn try_from(split: &ExpenseSplit) -> Result<Self, Self::Error> {
        Ok(Self {
            expense_id: ActiveValue::Set(split.expense_id),
            user_id: ActiveValue::Set(split.user_id),
            amount_minor: ActiveValue::Set(split.amount.minor_units()?),
        })
    }
}

impl From<Model> for ExpenseSplit {
    fn from(model: Model) -> Self {
        Self {
            expense_id: model.expense_id,
            user_id: model.user_id,
            amount: Money::from_minor(model.amount_minor),
        }
    }
}
