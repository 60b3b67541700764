//! Net balances.
//!
//! A [`Balance`] is never stored. [`BalanceSheet`] folds the ledger facts of
//! one group into a signed amount per member:
//!
//! - the payer of an expense is credited with its total;
//! - each split participant is debited with their share;
//! - a settlement debits `from_user` and credits `to_user`.
//!
//! Positive means the group owes this user, negative means this user owes
//! the group. Every expense adds its total once and removes the same total
//! through its splits, and every settlement moves one amount between two
//! members, so the balances of a group always sum to zero.
//!
//! Facts naming a user who is no longer a member are skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Expense, Money, Settlement};

/// Net position of one member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: Uuid,
    pub amount: Money,
}

/// Running balances keyed by member.
#[derive(Clone, Debug, Default)]
pub(crate) struct BalanceSheet {
    balances: BTreeMap<Uuid, Money>,
}

impl BalanceSheet {
    /// Starts every member at zero.
    pub(crate) fn new(members: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            balances: members.into_iter().map(|id| (id, Money::ZERO)).collect(),
        }
    }

    fn adjust(&mut self, user_id: Uuid, delta: Money) {
        if let Some(balance) = self.balances.get_mut(&user_id) {
            *balance += delta;
        }
    }

    pub(crate) fn apply_expense(&mut self, expense: &Expense) {
        self.adjust(expense.paid_by, expense.total_amount);
        for split in &expense.splits {
            self.adjust(split.user_id, -split.amount);
        }
    }

    pub(crate) fn apply_settlement(&mut self, settlement: &Settlement) {
        self.adjust(settlement.from_user, -settlement.amount);
        self.adjust(settlement.to_user, settlement.amount);
    }

    /// Balances ordered by user id.
    pub(crate) fn into_balances(self) -> Vec<Balance> {
        self.balances
            .into_iter()
            .map(|(user_id, amount)| Balance { user_id, amount })
            .collect()
    }
}
