use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    CreateExpenseCmd, EngineError, Expense, ExpenseSplit, Page, Paged, ResultEngine,
    StoreMembership, expense_splits, expenses, util::normalize_required_name, validate_splits,
};

use super::{Engine, with_tx};

impl Engine {
    /// Record an expense and its splits.
    ///
    /// Amount checks run before the store is touched. Membership of the actor,
    /// the payer and every participant is checked inside the write
    /// transaction; the expense row and all split rows are then committed
    /// together or not at all.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<Expense> {
        debug!(
            group_id = %cmd.group_id,
            user_id = %cmd.user_id,
            splits = cmd.splits.len(),
            "validating expense"
        );
        let description = normalize_required_name(&cmd.description, "description")?;
        let validated = validate_splits(cmd.total_amount, &cmd.splits).inspect_err(|err| {
            debug!(group_id = %cmd.group_id, error = %err, "expense rejected");
        })?;
        let payer = cmd.payer();

        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, cmd.group_id, cmd.user_id)
                    .await?;
                validated
                    .ensure_members(&StoreMembership::new(&db_tx), cmd.group_id, payer)
                    .await?;

                let expense = Expense::new(
                    cmd.group_id,
                    description,
                    validated.total(),
                    payer,
                    Utc::now(),
                );
                let splits = validated.into_rows(expense.id);
                let expense = insert_expense(&db_tx, expense, splits).await?;
                info!(
                    expense_id = %expense.id,
                    group_id = %expense.group_id,
                    paid_by = %expense.paid_by,
                    total = %expense.total_amount,
                    splits = expense.splits.len(),
                    "expense recorded"
                );
                Ok(expense)
            })
        })
        .await
        .inspect_err(|err| {
            if matches!(err, EngineError::Conflict(_)) {
                warn!(group_id = %cmd.group_id, error = %err, "expense refused by the store");
            }
        })
    }

    /// Return one expense of a group with its splits.
    pub async fn expense(
        &self,
        group_id: Uuid,
        expense_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Expense> {
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, group_id, user_id).await?;
                let model = expenses::Entity::find_by_id(expense_id)
                    .filter(expenses::Column::GroupId.eq(group_id))
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
                let splits = model
                    .find_related(expense_splits::Entity)
                    .order_by_asc(expense_splits::Column::UserId)
                    .all(&db_tx)
                    .await?;
                let mut expense = Expense::from(model);
                expense.splits = splits.into_iter().map(ExpenseSplit::from).collect();
                Ok(expense)
            })
        })
        .await
    }

    /// List the expenses of a group, newest first, each with its splits.
    pub async fn list_expenses(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        page: Page,
    ) -> ResultEngine<Paged<Expense>> {
        self.with_deadline(async {
            with_tx!(self, |db_tx| {
                self.require_member(&db_tx, group_id, user_id).await?;
                let query =
                    expenses::Entity::find().filter(expenses::Column::GroupId.eq(group_id));
                let total = query.clone().count(&db_tx).await?;
                let models = query
                    .order_by_desc(expenses::Column::CreatedAt)
                    .order_by_desc(expenses::Column::Id)
                    .limit(page.limit)
                    .offset(page.offset)
                    .all(&db_tx)
                    .await?;
                let splits = models.load_many(expense_splits::Entity, &db_tx).await?;

                let items = models
                    .into_iter()
                    .zip(splits)
                    .map(|(model, split_models)| {
                        let mut expense = Expense::from(model);
                        expense.splits = split_models.into_iter().map(ExpenseSplit::from).collect();
                        expense.splits.sort_by_key(|split| split.user_id);
                        expense
                    })
                    .collect();
                Ok(Paged { items, total, page })
            })
        })
        .await
    }
}

/// Insert an expense row followed by its split rows on an open transaction.
///
/// The caller owns the transaction; an error here leaves it uncommitted.
async fn insert_expense(
    db: &DatabaseTransaction,
    mut expense: Expense,
    splits: Vec<ExpenseSplit>,
) -> ResultEngine<Expense> {
    expenses::ActiveModel::try_from(&expense)?.insert(db).await?;
    let rows = splits
        .iter()
        .map(expense_splits::ActiveModel::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    expense_splits::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    expense.splits = splits;
    Ok(expense)
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{Database, DatabaseConnection};

    use super::*;
    use crate::{Money, groups};

    async fn setup() -> (Engine, DatabaseConnection, Uuid, Uuid) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        let alice = Uuid::new_v4();
        let group = engine.create_group("Flat", alice).await.unwrap();
        (engine, db, group.id, alice)
    }

    #[tokio::test]
    async fn failing_split_insert_leaves_no_rows() {
        let (engine, db, group_id, alice) = setup().await;
        let (bob, carol) = (Uuid::new_v4(), Uuid::new_v4());
        engine.add_member(group_id, alice, bob).await.unwrap();
        engine.add_member(group_id, alice, carol).await.unwrap();

        let expense = Expense::new(
            group_id,
            "groceries".to_string(),
            Money::from_minor(4000),
            alice,
            Utc::now(),
        );
        let split = |user_id, minor| ExpenseSplit {
            expense_id: expense.id,
            user_id,
            amount: Money::from_minor(minor),
        };
        // The fourth row repeats the first participant. All split rows go out
        // in one multi-row INSERT after the header, so the failing statement
        // leaves the header as the only prior write in the transaction.
        let splits = vec![
            split(alice, 1000),
            split(bob, 1000),
            split(carol, 1000),
            split(alice, 1000),
        ];

        let db_tx = db.begin().await.unwrap();
        let result = insert_expense(&db_tx, expense, splits).await;
        assert!(matches!(result, Err(EngineError::Conflict(_))), "{result:?}");
        drop(db_tx);

        assert_eq!(expenses::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(expense_splits::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(groups::Entity::find().count(&db).await.unwrap(), 1);
    }
}
