use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Balance, Expense, ExpenseSplit, ResultEngine, Settlement, balances::BalanceSheet,
    expense_splits, expenses, group_members, settlements,
};

use super::{Engine, with_tx};

impl Engine {
    /// Net balance of every current member of a group, ordered by user id.
    ///
    /// Reads membership, expenses joined with their splits, and settlements
    /// in one transaction, one scan each.
    pub async fn balances(&self, group_id: Uuid, user_id: Uuid) -> ResultEngine<Vec<Balance>> {
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, group_id, user_id).await?;

                let members = group_members::Entity::find()
                    .filter(group_members::Column::GroupId.eq(group_id))
                    .all(&db_tx)
                    .await?;
                let mut sheet = BalanceSheet::new(members.into_iter().map(|m| m.user_id));

                let expense_rows = expenses::Entity::find()
                    .filter(expenses::Column::GroupId.eq(group_id))
                    .find_with_related(expense_splits::Entity)
                    .all(&db_tx)
                    .await?;
                for (model, split_models) in expense_rows {
                    let mut expense = Expense::from(model);
                    expense.splits = split_models.into_iter().map(ExpenseSplit::from).collect();
                    sheet.apply_expense(&expense);
                }

                let settlement_rows = settlements::Entity::find()
                    .filter(settlements::Column::GroupId.eq(group_id))
                    .all(&db_tx)
                    .await?;
                for model in settlement_rows {
                    sheet.apply_settlement(&Settlement::from(model));
                }

                Ok(sheet.into_balances())
            })
        })
        .await
    }
}
