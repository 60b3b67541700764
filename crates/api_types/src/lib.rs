//! Request and response bodies of the HTTP API.
//!
//! Monetary amounts travel as decimal strings with at most two fractional
//! digits (`"33.33"`), never as JSON numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error body returned with every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `?limit=&offset=` query parameters of list endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
    }
}

pub mod member {
    use super::*;

    /// Request body for adding a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub user_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: Uuid,
        pub joined_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitNew {
        pub user_id: Uuid,
        /// Decimal string, e.g. `"33.34"`.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        /// Decimal string, must be > 0.
        pub total_amount: String,
        /// Defaults to the caller.
        pub paid_by: Option<Uuid>,
        /// Must sum exactly to `total_amount`.
        pub splits: Vec<SplitNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub user_id: Uuid,
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub description: String,
        pub total_amount: String,
        pub paid_by: Uuid,
        pub created_at: DateTime<Utc>,
        pub splits: Vec<SplitView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
        pub total: u64,
        pub limit: u64,
        pub offset: u64,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementNew {
        pub from_user: Uuid,
        pub to_user: Uuid,
        /// Decimal string, must be > 0.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub from_user: Uuid,
        pub to_user: Uuid,
        pub amount: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementListResponse {
        pub settlements: Vec<SettlementView>,
        pub total: u64,
        pub limit: u64,
        pub offset: u64,
    }
}

pub mod balance {
    use super::*;

    /// Net position of one member.
    ///
    /// Positive: the group owes this user. Negative: this user owes the
    /// group.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: Uuid,
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub group_id: Uuid,
        pub balances: Vec<BalanceView>,
    }
}
