use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{ensure_not_blank, ensure_positive, Displayable, Identifiable};
use crate::domain::transaction::Transaction;
use crate::errors::LedgerError;

/// A spending cap for one category over an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub spent_amount: i64,
}

impl Budget {
    /// Whether `transaction` counts against this budget.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        transaction.is_expense()
            && transaction.category.as_deref() == Some(self.category.as_str())
            && self.covers(transaction.date)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Sum of every matching expense in `transactions`, saturating at `i64::MAX`.
    pub fn spend_in<'a, I>(&self, transactions: I) -> i64
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .filter(|txn| self.matches(txn))
            .fold(0i64, |spent, txn| spent.saturating_add(txn.amount))
    }

    pub fn remaining(&self) -> i64 {
        self.amount - self.spent_amount
    }
}

impl Identifiable for Budget {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Budget {
    fn display_label(&self) -> String {
        format!(
            "budget:{} {} [{}..{}]",
            self.id, self.category, self.start_date, self.end_date
        )
    }
}

/// Budget definition as supplied by the caller; the spent amount is always derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBudget {
    pub id: String,
    pub category: String,
    pub amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewBudget {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        amount: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            amount,
            start_date,
            end_date,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        ensure_not_blank("budget id", &self.id)?;
        ensure_not_blank("budget category", &self.category)?;
        ensure_positive("budget amount", self.amount)?;
        ensure_range(self.start_date, self.end_date)
    }

    pub(crate) fn into_budget(self, spent_amount: i64) -> Budget {
        Budget {
            id: self.id,
            category: self.category,
            amount: self.amount,
            start_date: self.start_date,
            end_date: self.end_date,
            spent_amount,
        }
    }
}

/// Field overwrites accepted by `update_budget`. The spent amount is not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl BudgetPatch {
    pub fn range(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    /// True when applying the patch can change which transactions match.
    pub fn changes_match_set(&self, budget: &Budget) -> bool {
        self.category
            .as_ref()
            .is_some_and(|category| *category != budget.category)
            || self.start_date.is_some_and(|start| start != budget.start_date)
            || self.end_date.is_some_and(|end| end != budget.end_date)
    }

    /// Validates the patch against the budget it will be merged into.
    pub fn validate_against(&self, budget: &Budget) -> Result<(), LedgerError> {
        if let Some(category) = self.category.as_deref() {
            ensure_not_blank("budget category", category)?;
        }
        if let Some(amount) = self.amount {
            ensure_positive("budget amount", amount)?;
        }
        ensure_range(
            self.start_date.unwrap_or(budget.start_date),
            self.end_date.unwrap_or(budget.end_date),
        )
    }

    pub fn apply_to(self, budget: &mut Budget) {
        if let Some(category) = self.category {
            budget.category = category;
        }
        if let Some(amount) = self.amount {
            budget.amount = amount;
        }
        if let Some(start) = self.start_date {
            budget.start_date = start;
        }
        if let Some(end) = self.end_date {
            budget.end_date = end;
        }
    }
}

pub fn ensure_range(start: NaiveDate, end: NaiveDate) -> Result<(), LedgerError> {
    if start > end {
        return Err(LedgerError::InvalidRange { start, end });
    }
    Ok(())
}

/// Derived progress row for one budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetProgress {
    pub id: String,
    pub category: String,
    pub amount: i64,
    pub spent_amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Percentage of the cap already spent. Not clamped; UIs cap the bar at 100.
    pub progress: f64,
    pub remaining: i64,
}

impl BudgetProgress {
    pub fn from_budget(budget: &Budget) -> Self {
        let progress = if budget.amount == 0 {
            0.0
        } else {
            budget.spent_amount as f64 / budget.amount as f64 * 100.0
        };
        Self {
            id: budget.id.clone(),
            category: budget.category.clone(),
            amount: budget.amount,
            spent_amount: budget.spent_amount,
            start_date: budget.start_date,
            end_date: budget.end_date,
            progress,
            remaining: budget.remaining(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.remaining < 0
    }
}
