use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Budget, Identifiable, Plan, Transaction, TransactionKind};

pub(crate) const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Full serializable state of one user's finances.
///
/// `income`, `expense` and `balance` are running totals and each budget's
/// `spent_amount` is a cache; both are kept consistent by the services in
/// `core::services`, never recomputed on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub income: i64,
    #[serde(default)]
    pub expense: i64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

/// Transient picks made by entry forms before a transaction or budget is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Aggregates derived by summation, used to audit the running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: i64,
    pub expense: i64,
    pub balance: i64,
}

impl Totals {
    /// Totals after adding `amount` of `kind`, or `None` on overflow.
    pub fn credited(self, kind: TransactionKind, amount: i64) -> Option<Totals> {
        match kind {
            TransactionKind::Income => Some(Totals {
                income: self.income.checked_add(amount)?,
                balance: self.balance.checked_add(amount)?,
                ..self
            }),
            TransactionKind::Expense => Some(Totals {
                expense: self.expense.checked_add(amount)?,
                balance: self.balance.checked_sub(amount)?,
                ..self
            }),
        }
    }

    /// Reverses `credited`, or `None` on overflow.
    pub fn debited(self, kind: TransactionKind, amount: i64) -> Option<Totals> {
        match kind {
            TransactionKind::Income => Some(Totals {
                income: self.income.checked_sub(amount)?,
                balance: self.balance.checked_sub(amount)?,
                ..self
            }),
            TransactionKind::Expense => Some(Totals {
                expense: self.expense.checked_sub(amount)?,
                balance: self.balance.checked_add(amount)?,
                ..self
            }),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            balance: 0,
            income: 0,
            expense: 0,
            transactions: Vec::new(),
            budgets: Vec::new(),
            plans: Vec::new(),
            search_query: String::new(),
            selection: Selection::default(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: &str) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn remove_transaction(&mut self, id: &str) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        Some(self.transactions.remove(index))
    }

    pub fn budget(&self, id: &str) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == id)
    }

    pub fn budget_mut(&mut self, id: &str) -> Option<&mut Budget> {
        self.budgets.iter_mut().find(|budget| budget.id == id)
    }

    pub fn remove_budget(&mut self, id: &str) -> Option<Budget> {
        let index = self.budgets.iter().position(|budget| budget.id == id)?;
        Some(self.budgets.remove(index))
    }

    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn plan_mut(&mut self, id: &str) -> Option<&mut Plan> {
        self.plans.iter_mut().find(|plan| plan.id == id)
    }

    pub fn remove_plan(&mut self, id: &str) -> Option<Plan> {
        let index = self.plans.iter().position(|plan| plan.id == id)?;
        Some(self.plans.remove(index))
    }

    /// Installs totals produced by `Totals::credited` / `Totals::debited`.
    pub(crate) fn set_totals(&mut self, totals: Totals) {
        self.income = totals.income;
        self.expense = totals.expense;
        self.balance = totals.balance;
    }

    pub fn running_totals(&self) -> Totals {
        Totals {
            income: self.income,
            expense: self.expense,
            balance: self.balance,
        }
    }

    /// Totals re-derived from the transaction list, `None` if they overflow `i64`.
    pub fn summed_totals(&self) -> Option<Totals> {
        self.transactions
            .iter()
            .try_fold(Totals::default(), |totals, txn| totals.credited(txn.kind, txn.amount))
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

/// Detects broken invariants within a ledger snapshot.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let mut warnings = Vec::new();

    let running = ledger.running_totals();
    let Some(summed) = ledger.summed_totals() else {
        warnings.push("transaction amounts overflow the ledger totals".to_string());
        return warnings;
    };
    if running != summed {
        warnings.push(format!(
            "running totals (income {}, expense {}, balance {}) disagree with transactions (income {}, expense {}, balance {})",
            running.income, running.expense, running.balance, summed.income, summed.expense, summed.balance
        ));
    }

    for budget in &ledger.budgets {
        let expected = budget.spend_in(&ledger.transactions);
        if budget.spent_amount != expected {
            warnings.push(format!(
                "budget {} caches spent amount {} but matching expenses sum to {}",
                budget.id, budget.spent_amount, expected
            ));
        }
        if budget.start_date > budget.end_date {
            warnings.push(format!(
                "budget {} has start {} after end {}",
                budget.id, budget.start_date, budget.end_date
            ));
        }
    }

    push_duplicate_ids(&mut warnings, "transaction", &ledger.transactions);
    push_duplicate_ids(&mut warnings, "budget", &ledger.budgets);
    push_duplicate_ids(&mut warnings, "plan", &ledger.plans);
    warnings
}

fn push_duplicate_ids<T: Identifiable>(warnings: &mut Vec<String>, entity: &str, items: &[T]) {
    let mut seen = std::collections::HashSet::new();
    for id in items.iter().map(Identifiable::id) {
        if !seen.insert(id) {
            warnings.push(format!("duplicate {} id {}", entity, id));
        }
    }
}
