pub mod budget_service;
pub mod plan_service;
pub mod query_service;
pub mod transaction_service;

pub use budget_service::{BudgetService, BudgetSyncPolicy};
pub use plan_service::PlanService;
pub use query_service::{DailyExpense, QueryService, SearchMode};
pub use transaction_service::TransactionService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, LedgerError>;
