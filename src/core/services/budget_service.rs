//! Budget tracker: owns the budget list and keeps each cached spent amount in
//! step with the expense transactions it matches.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::services::ServiceResult;
use crate::domain::budget::{Budget, BudgetPatch, NewBudget};
use crate::domain::transaction::Transaction;
use crate::errors::LedgerError;
use crate::ledger::Ledger;

/// How budget spend reacts to transaction edits and removals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetSyncPolicy {
    /// Every transaction mutation leaves each spent amount equal to a full rescan.
    #[default]
    Strict,
    /// Only additions are credited; edits and removals leave spent amounts alone.
    AddOnly,
}

pub struct BudgetService;

impl BudgetService {
    /// Creates a budget whose spent amount is computed from the current transactions.
    pub fn add(ledger: &mut Ledger, budget: NewBudget) -> ServiceResult<String> {
        budget.validate()?;
        if ledger.budget(&budget.id).is_some() {
            return Err(LedgerError::duplicate("budget", budget.id));
        }

        let mut created = budget.into_budget(0);
        created.spent_amount = created.spend_in(&ledger.transactions);
        let id = created.id.clone();
        debug!(id = %id, category = %created.category, spent = created.spent_amount, "budget added");
        ledger.budgets.push(created);
        Ok(id)
    }

    /// Applies `patch`; a change of category or range triggers a full rescan.
    pub fn update(ledger: &mut Ledger, id: &str, patch: BudgetPatch) -> ServiceResult<()> {
        let index = ledger
            .budgets
            .iter()
            .position(|budget| budget.id == id)
            .ok_or_else(|| LedgerError::not_found("budget", id))?;

        patch.validate_against(&ledger.budgets[index])?;
        let rescan = patch.changes_match_set(&ledger.budgets[index]);
        patch.apply_to(&mut ledger.budgets[index]);

        if rescan {
            let spent = ledger.budgets[index].spend_in(&ledger.transactions);
            ledger.budgets[index].spent_amount = spent;
        }
        debug!(id, rescan, spent = ledger.budgets[index].spent_amount, "budget updated");
        Ok(())
    }

    /// Removes the budget identified by `id`. Unknown ids are ignored.
    pub fn remove(ledger: &mut Ledger, id: &str) -> Option<Budget> {
        let removed = ledger.remove_budget(id)?;
        debug!(id, "budget removed");
        Some(removed)
    }

    /// Credits a freshly added transaction to every budget it matches.
    /// Returns how many budgets were touched; nothing changes on overflow.
    pub fn on_transaction_added(
        ledger: &mut Ledger,
        transaction: &Transaction,
    ) -> ServiceResult<usize> {
        if !transaction.is_expense() || transaction.category.is_none() {
            return Ok(0);
        }
        let mut credited = Vec::new();
        for (index, budget) in ledger.budgets.iter().enumerate() {
            if budget.matches(transaction) {
                let spent = budget
                    .spent_amount
                    .checked_add(transaction.amount)
                    .ok_or_else(LedgerError::overflow)?;
                credited.push((index, spent));
            }
        }
        for &(index, spent) in &credited {
            ledger.budgets[index].spent_amount = spent;
        }
        Ok(credited.len())
    }

    /// Rescans every budget. Returns how many spent amounts changed.
    pub fn recompute_all(ledger: &mut Ledger) -> usize {
        let transactions = &ledger.transactions;
        let mut changed = 0;
        for budget in ledger.budgets.iter_mut() {
            let spent = budget.spend_in(transactions);
            if spent != budget.spent_amount {
                budget.spent_amount = spent;
                changed += 1;
            }
        }
        changed
    }

    pub fn list(ledger: &Ledger) -> &[Budget] {
        &ledger.budgets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::TransactionService;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn food_expense(id: &str, amount: i64, on: NaiveDate) -> Transaction {
        Transaction::expense(id, "Food", amount, on).with_category("Food")
    }

    #[test]
    fn update_fails_for_missing_budget() {
        let mut ledger = Ledger::new();
        let err = BudgetService::update(&mut ledger, "nope", BudgetPatch::default()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "budget", .. }));
    }

    #[test]
    fn update_rejects_range_inverted_by_single_bound() {
        let mut ledger = Ledger::new();
        BudgetService::add(
            &mut ledger,
            NewBudget::new("b1", "Food", 500, date(2024, 6, 1), date(2024, 6, 30)),
        )
        .unwrap();
        let patch = BudgetPatch {
            start_date: Some(date(2024, 7, 1)),
            ..BudgetPatch::default()
        };
        let err = BudgetService::update(&mut ledger, "b1", patch).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRange { .. }));
        assert_eq!(ledger.budget("b1").unwrap().start_date, date(2024, 6, 1));
    }

    #[test]
    fn category_change_rescans() {
        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, food_expense("1", 80, date(2024, 6, 5))).unwrap();
        TransactionService::add(
            &mut ledger,
            Transaction::expense("2", "Bus", 20, date(2024, 6, 6)).with_category("Travel"),
        )
        .unwrap();
        BudgetService::add(
            &mut ledger,
            NewBudget::new("b1", "Food", 500, date(2024, 6, 1), date(2024, 6, 30)),
        )
        .unwrap();
        assert_eq!(ledger.budget("b1").unwrap().spent_amount, 80);

        let patch = BudgetPatch {
            category: Some("Travel".into()),
            ..BudgetPatch::default()
        };
        BudgetService::update(&mut ledger, "b1", patch).unwrap();
        assert_eq!(ledger.budget("b1").unwrap().spent_amount, 20);
    }

    #[test]
    fn amount_change_keeps_spent_amount() {
        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, food_expense("1", 80, date(2024, 6, 5))).unwrap();
        BudgetService::add(
            &mut ledger,
            NewBudget::new("b1", "Food", 500, date(2024, 6, 1), date(2024, 6, 30)),
        )
        .unwrap();
        let patch = BudgetPatch {
            amount: Some(100),
            ..BudgetPatch::default()
        };
        BudgetService::update(&mut ledger, "b1", patch).unwrap();
        let budget = ledger.budget("b1").unwrap();
        assert_eq!(budget.amount, 100);
        assert_eq!(budget.spent_amount, 80);
    }

    #[test]
    fn added_expense_credits_every_matching_budget() {
        let mut ledger = Ledger::new();
        BudgetService::add(
            &mut ledger,
            NewBudget::new("month", "Food", 500, date(2024, 6, 1), date(2024, 6, 30)),
        )
        .unwrap();
        BudgetService::add(
            &mut ledger,
            NewBudget::new("week", "Food", 100, date(2024, 6, 3), date(2024, 6, 9)),
        )
        .unwrap();
        TransactionService::add(&mut ledger, food_expense("1", 40, date(2024, 6, 4))).unwrap();
        TransactionService::add(&mut ledger, food_expense("2", 15, date(2024, 6, 20))).unwrap();

        assert_eq!(ledger.budget("month").unwrap().spent_amount, 55);
        assert_eq!(ledger.budget("week").unwrap().spent_amount, 40);
    }

    #[test]
    fn remove_unknown_budget_is_noop() {
        let mut ledger = Ledger::new();
        assert!(BudgetService::remove(&mut ledger, "ghost").is_none());
        assert!(ledger.budgets.is_empty());
    }
}
