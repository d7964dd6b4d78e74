//! Transaction ledger: owns the transaction list and the running totals.

use tracing::debug;

use crate::core::services::{BudgetService, BudgetSyncPolicy, ServiceResult};
use crate::domain::transaction::{Transaction, TransactionPatch};
use crate::errors::LedgerError;
use crate::ledger::Ledger;

/// Provides validated CRUD helpers for ledger transactions.
pub struct TransactionService;

impl TransactionService {
    /// Appends a transaction, updates the totals and credits matching budgets.
    pub fn add(ledger: &mut Ledger, transaction: Transaction) -> ServiceResult<String> {
        transaction.validate()?;
        if ledger.transaction(&transaction.id).is_some() {
            return Err(LedgerError::duplicate("transaction", transaction.id));
        }

        let totals = ledger
            .running_totals()
            .credited(transaction.kind, transaction.amount)
            .ok_or_else(LedgerError::overflow)?;
        let touched = BudgetService::on_transaction_added(ledger, &transaction)?;
        ledger.set_totals(totals);
        let id = transaction.id.clone();
        debug!(
            id = %id,
            kind = %transaction.kind,
            amount = transaction.amount,
            budgets = touched,
            "transaction added"
        );
        ledger.transactions.push(transaction);
        Ok(id)
    }

    /// Overwrites fields of the transaction identified by `id`.
    ///
    /// The old amount is reverted under the old kind before the patch lands and
    /// the new amount is applied under the new kind afterwards.
    pub fn update(
        ledger: &mut Ledger,
        id: &str,
        patch: TransactionPatch,
        policy: BudgetSyncPolicy,
    ) -> ServiceResult<()> {
        patch.validate()?;
        let index = ledger
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| LedgerError::not_found("transaction", id))?;
        if !patch.has_effect() {
            debug!(id, "empty transaction patch skipped");
            return Ok(());
        }

        let (old_kind, old_amount) = {
            let txn = &ledger.transactions[index];
            (txn.kind, txn.amount)
        };
        let new_kind = patch.kind.unwrap_or(old_kind);
        let new_amount = patch.amount.unwrap_or(old_amount);
        let totals = ledger
            .running_totals()
            .debited(old_kind, old_amount)
            .and_then(|totals| totals.credited(new_kind, new_amount))
            .ok_or_else(LedgerError::overflow)?;

        patch.apply_to(&mut ledger.transactions[index]);
        ledger.set_totals(totals);

        if policy == BudgetSyncPolicy::Strict {
            BudgetService::recompute_all(ledger);
        }
        debug!(id, old_amount, new_amount, "transaction updated");
        Ok(())
    }

    /// Removes the transaction identified by `id`. Unknown ids are ignored.
    pub fn remove(
        ledger: &mut Ledger,
        id: &str,
        policy: BudgetSyncPolicy,
    ) -> Option<Transaction> {
        let removed = ledger.remove_transaction(id)?;
        // Removing a counted amount cannot overflow while the totals match the list.
        if let Some(totals) = ledger.running_totals().debited(removed.kind, removed.amount) {
            ledger.set_totals(totals);
        }
        if policy == BudgetSyncPolicy::Strict && removed.is_expense() {
            BudgetService::recompute_all(ledger);
        }
        debug!(id, amount = removed.amount, "transaction removed");
        Some(removed)
    }

    /// Returns the ledger's transactions in insertion order.
    pub fn list(ledger: &Ledger) -> &[Transaction] {
        &ledger.transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn update_fails_for_missing_transaction() {
        let mut ledger = Ledger::new();
        let err = TransactionService::update(
            &mut ledger,
            "missing",
            TransactionPatch::amount(10),
            BudgetSyncPolicy::Strict,
        )
        .expect_err("update must fail for unknown id");
        assert!(
            matches!(err, LedgerError::NotFound { ref id, .. } if id == "missing"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn empty_patch_leaves_ledger_untouched() {
        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, Transaction::income("1", "Salary", 1000, june(1)))
            .unwrap();
        let before = ledger.clone();

        TransactionService::update(
            &mut ledger,
            "1",
            TransactionPatch::default(),
            BudgetSyncPolicy::Strict,
        )
        .unwrap();
        assert_eq!(ledger, before);

        let err = TransactionService::update(
            &mut ledger,
            "ghost",
            TransactionPatch::default(),
            BudgetSyncPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn overflowing_add_is_rejected_and_shrinking_update_still_works() {
        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, Transaction::income("1", "Prize", i64::MAX, june(1)))
            .unwrap();
        let err = TransactionService::add(&mut ledger, Transaction::income("2", "Tip", 1, june(2)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.income, i64::MAX);
        assert_eq!(ledger.transactions.len(), 1);

        TransactionService::update(
            &mut ledger,
            "1",
            TransactionPatch::amount(10),
            BudgetSyncPolicy::Strict,
        )
        .unwrap();
        assert_eq!(ledger.income, 10);
        assert_eq!(ledger.balance, 10);
    }

    #[test]
    fn remove_returns_deleted_transaction() {
        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, Transaction::income("1", "Salary", 1000, june(1)))
            .unwrap();

        let removed = TransactionService::remove(&mut ledger, "1", BudgetSyncPolicy::Strict)
            .expect("transaction removed");
        assert_eq!(removed.id, "1");
        assert!(ledger.transaction("1").is_none());
        assert_eq!(ledger.balance, 0);
    }

    #[test]
    fn add_rejects_duplicate_id_without_touching_totals() {
        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, Transaction::income("1", "Salary", 1000, june(1)))
            .unwrap();
        let err = TransactionService::add(&mut ledger, Transaction::expense("1", "Rent", 400, june(2)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateId { .. }));
        assert_eq!(ledger.expense, 0);
        assert_eq!(ledger.balance, 1000);
        assert_eq!(ledger.transactions.len(), 1);
    }

    #[test]
    fn add_rejects_non_positive_amount() {
        let mut ledger = Ledger::new();
        let err = TransactionService::add(&mut ledger, Transaction::expense("1", "Refund", -5, june(2)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.transactions.is_empty());
    }

    #[test]
    fn switching_kind_moves_amount_between_totals() {
        let mut ledger = Ledger::new();
        TransactionService::add(&mut ledger, Transaction::income("1", "Gift", 300, june(3))).unwrap();
        let patch = TransactionPatch {
            kind: Some(crate::domain::TransactionKind::Expense),
            amount: Some(200),
            ..TransactionPatch::default()
        };
        TransactionService::update(&mut ledger, "1", patch, BudgetSyncPolicy::Strict).unwrap();
        assert_eq!(ledger.income, 0);
        assert_eq!(ledger.expense, 200);
        assert_eq!(ledger.balance, -200);
    }
}
