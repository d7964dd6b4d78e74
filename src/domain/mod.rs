pub mod budget;
pub mod common;
pub mod plan;
pub mod transaction;

pub use budget::{Budget, BudgetPatch, BudgetProgress, NewBudget};
pub use common::{format_date, parse_date, Displayable, Identifiable, Month, DATE_FORMAT};
pub use plan::{Plan, PlanPatch};
pub use transaction::{Transaction, TransactionKind, TransactionPatch};
