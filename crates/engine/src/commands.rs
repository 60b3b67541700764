//! Command structs for engine write operations.
//!
//! These types group the parameters of expense and settlement creation,
//! keeping call sites readable and avoiding long argument lists.

use uuid::Uuid;

use crate::Money;

/// One participant's share of a proposed expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitInput {
    pub user_id: Uuid,
    pub amount: Money,
}

impl SplitInput {
    #[must_use]
    pub fn new(user_id: Uuid, amount: Money) -> Self {
        Self { user_id, amount }
    }
}

/// Create an expense together with its splits.
///
/// `user_id` is the acting user. The payer defaults to the actor unless set
/// with [`CreateExpenseCmd::paid_by`].
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub total_amount: Money,
    pub paid_by: Option<Uuid>,
    pub splits: Vec<SplitInput>,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(
        group_id: Uuid,
        user_id: Uuid,
        description: impl Into<String>,
        total_amount: Money,
    ) -> Self {
        Self {
            group_id,
            user_id,
            description: description.into(),
            total_amount,
            paid_by: None,
            splits: Vec::new(),
        }
    }

    #[must_use]
    pub fn paid_by(mut self, paid_by: Uuid) -> Self {
        self.paid_by = Some(paid_by);
        self
    }

    #[must_use]
    pub fn split(mut self, user_id: Uuid, amount: Money) -> Self {
        self.splits.push(SplitInput::new(user_id, amount));
        self
    }

    #[must_use]
    pub fn splits(mut self, splits: impl IntoIterator<Item = SplitInput>) -> Self {
        self.splits.extend(splits);
        self
    }

    /// The member who paid: the explicit payer, or the actor.
    #[must_use]
    pub fn payer(&self) -> Uuid {
        self.paid_by.unwrap_or(self.user_id)
    }
}

/// Record a direct payment between two members.
#[derive(Clone, Debug)]
pub struct CreateSettlementCmd {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub amount: Money,
}

impl CreateSettlementCmd {
    #[must_use]
    pub fn new(group_id: Uuid, user_id: Uuid, from_user: Uuid, to_user: Uuid, amount: Money) -> Self {
        Self {
            group_id,
            user_id,
            from_user,
            to_user,
            amount,
        }
    }
}
