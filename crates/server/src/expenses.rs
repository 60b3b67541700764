//! Expense endpoints

use api_types::{
    ListQuery,
    expense::{ExpenseListResponse, ExpenseNew, ExpenseView, SplitView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CreateExpenseCmd, Money, Page, SplitInput};
use uuid::Uuid;

use crate::{Actor, ServerError, server::ServerState};

fn expense_view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        group_id: expense.group_id,
        description: expense.description,
        total_amount: expense.total_amount.to_string(),
        paid_by: expense.paid_by,
        created_at: expense.created_at,
        splits: expense
            .splits
            .into_iter()
            .map(|split| SplitView {
                user_id: split.user_id,
                amount: split.amount.to_string(),
            })
            .collect(),
    }
}

pub async fn expense_new(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let total_amount: Money = payload.total_amount.parse()?;
    let splits = payload
        .splits
        .iter()
        .map(|split| Ok(SplitInput::new(split.user_id, split.amount.parse()?)))
        .collect::<Result<Vec<_>, ServerError>>()?;

    let mut cmd = CreateExpenseCmd::new(group_id, user_id, payload.description, total_amount)
        .splits(splits);
    if let Some(paid_by) = payload.paid_by {
        cmd = cmd.paid_by(paid_by);
    }

    let expense = state.engine.create_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

pub async fn get(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(group_id, expense_id, user_id).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn list(
    Extension(Actor(user_id)): Extension<Actor>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let page = Page::new(query.limit, query.offset)?;
    let listed = state.engine.list_expenses(group_id, user_id, page).await?;

    Ok(Json(ExpenseListResponse {
        expenses: listed.items.into_iter().map(expense_view).collect(),
        total: listed.total,
        limit: listed.page.limit,
        offset: listed.page.offset,
    }))
}
