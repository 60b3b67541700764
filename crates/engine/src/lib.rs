//! Group expense ledger core.
//!
//! The engine records expenses with their splits and direct settlements
//! between members of a group, and derives every member's net balance from
//! those facts on demand. All writes go through [`Engine`], which validates a
//! request completely before opening a store transaction and then commits
//! every row of it or none.

pub use balances::Balance;
pub use commands::{CreateExpenseCmd, CreateSettlementCmd, SplitInput};
pub use error::{EngineError, ValidationError};
pub use expense_splits::ExpenseSplit;
pub use expenses::Expense;
pub use group_members::Member;
pub use groups::Group;
pub use membership::{MembershipOracle, StoreMembership};
pub use money::{MINOR_UNIT_SCALE, Money};
pub use ops::{Engine, EngineBuilder};
pub use page::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, Paged};
pub use settlements::Settlement;
pub use validator::{ValidatedSplits, validate_splits};

mod balances;
mod commands;
mod error;
mod expense_splits;
mod expenses;
mod group_members;
mod groups;
mod membership;
mod money;
mod ops;
mod page;
mod settlements;
mod util;
mod validator;

type ResultEngine<T> = Result<T, EngineError>;
