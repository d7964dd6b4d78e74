//! Read-only views derived from the ledger. Nothing here mutates state.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::budget::BudgetProgress;
use crate::domain::common::{format_date, Month};
use crate::domain::transaction::Transaction;
use crate::ledger::Ledger;

/// Which transaction fields a search query is matched against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    TitleOnly,
    /// Title, the amount as a plain integer, and the `YYYY-MM-DD` date.
    #[default]
    TitleAmountDate,
}

/// Expense total for one calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyExpense {
    pub date: NaiveDate,
    pub total: i64,
}

pub struct QueryService;

impl QueryService {
    /// Case-insensitive search; an empty query returns everything in insertion order.
    pub fn filtered_transactions<'a>(
        ledger: &'a Ledger,
        query: &str,
        mode: SearchMode,
    ) -> Vec<&'a Transaction> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return ledger.transactions.iter().collect();
        }
        ledger
            .transactions
            .iter()
            .filter(|txn| matches_query(txn, &needle, mode))
            .collect()
    }

    pub fn budget_progress(ledger: &Ledger) -> Vec<BudgetProgress> {
        ledger.budgets.iter().map(BudgetProgress::from_budget).collect()
    }

    /// Budget aggregates saturate instead of wrapping.
    pub fn total_budget_amount(ledger: &Ledger) -> i64 {
        saturating_sum(ledger.budgets.iter().map(|budget| budget.amount))
    }

    pub fn total_spent_amount(ledger: &Ledger) -> i64 {
        saturating_sum(ledger.budgets.iter().map(|budget| budget.spent_amount))
    }

    pub fn remaining_amount(ledger: &Ledger) -> i64 {
        Self::total_budget_amount(ledger).saturating_sub(Self::total_spent_amount(ledger))
    }

    /// One row per day of `month`, zero-filled, in ascending date order.
    pub fn daily_expense_series(ledger: &Ledger, month: Month) -> Vec<DailyExpense> {
        let mut totals: HashMap<NaiveDate, i64> = HashMap::new();
        for txn in ledger
            .transactions
            .iter()
            .filter(|txn| txn.is_expense() && month.contains(txn.date))
        {
            *totals.entry(txn.date).or_insert(0) += txn.amount;
        }
        month
            .days()
            .map(|date| DailyExpense {
                date,
                total: totals.get(&date).copied().unwrap_or(0),
            })
            .collect()
    }

    pub fn monthly_expense_total(ledger: &Ledger, month: Month) -> i64 {
        ledger
            .transactions
            .iter()
            .filter(|txn| txn.is_expense() && month.contains(txn.date))
            .map(|txn| txn.amount)
            .sum()
    }

    /// Transactions dated within `month`, newest first.
    pub fn transactions_in_month(ledger: &Ledger, month: Month) -> Vec<&Transaction> {
        newest_first(ledger.transactions.iter().filter(|txn| month.contains(txn.date)))
    }

    /// Transactions dated exactly `date`.
    pub fn transactions_on(ledger: &Ledger, date: NaiveDate) -> Vec<&Transaction> {
        newest_first(ledger.transactions.iter().filter(|txn| txn.date == date))
    }
}

fn saturating_sum(amounts: impl Iterator<Item = i64>) -> i64 {
    amounts.fold(0, i64::saturating_add)
}

fn matches_query(txn: &Transaction, needle: &str, mode: SearchMode) -> bool {
    if txn.title.to_lowercase().contains(needle) {
        return true;
    }
    match mode {
        SearchMode::TitleOnly => false,
        SearchMode::TitleAmountDate => {
            txn.amount.to_string().contains(needle) || format_date(txn.date).contains(needle)
        }
    }
}

fn newest_first<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Vec<&'a Transaction> {
    let mut rows: Vec<&Transaction> = transactions.collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{BudgetService, BudgetSyncPolicy, TransactionService};
    use crate::domain::NewBudget;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let rows = [
            Transaction::income("1", "Salary", 10_000_000, date("2025-04-15")),
            Transaction::expense("2", "Shopping", 200_000, date("2025-04-15")).with_category("Shopping"),
            Transaction::expense("3", "Groceries", 150_000, date("2025-04-12")).with_category("Food"),
            Transaction::income("4", "Freelance", 2_000_000, date("2025-04-10")),
            Transaction::expense("5", "Groceries", 50_000, date("2025-04-12")).with_category("Food"),
            Transaction::expense("6", "Rent", 3_000_000, date("2025-05-01")),
        ];
        for txn in rows {
            TransactionService::add(&mut ledger, txn).unwrap();
        }
        ledger
    }

    #[test]
    fn empty_query_returns_all_in_order() {
        let ledger = sample_ledger();
        let ids: Vec<_> = QueryService::filtered_transactions(&ledger, "", SearchMode::TitleOnly)
            .iter()
            .map(|txn| txn.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn whitespace_query_is_matched_literally() {
        let mut ledger = sample_ledger();
        TransactionService::add(
            &mut ledger,
            Transaction::income("7", "Side gig", 500_000, date("2025-04-20")),
        )
        .unwrap();
        let hits = QueryService::filtered_transactions(&ledger, " ", SearchMode::TitleOnly);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "7");
        assert!(QueryService::filtered_transactions(&ledger, " rent", SearchMode::TitleOnly).is_empty());
    }

    #[test]
    fn title_search_is_case_insensitive() {
        let ledger = sample_ledger();
        let hits = QueryService::filtered_transactions(&ledger, "GROC", SearchMode::TitleOnly);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn amount_and_date_matching_depends_on_mode() {
        let ledger = sample_ledger();
        assert!(QueryService::filtered_transactions(&ledger, "2025-05", SearchMode::TitleOnly).is_empty());
        let by_date = QueryService::filtered_transactions(&ledger, "2025-05", SearchMode::TitleAmountDate);
        assert_eq!(by_date.len(), 1);
        let by_amount = QueryService::filtered_transactions(&ledger, "150000", SearchMode::TitleAmountDate);
        assert_eq!(by_amount[0].id, "3");
    }

    #[test]
    fn daily_series_zero_fills_every_day() {
        let ledger = sample_ledger();
        let april: Month = "2025-04".parse().unwrap();
        let series = QueryService::daily_expense_series(&ledger, april);
        assert_eq!(series.len(), 30);
        assert_eq!(series[0].date, date("2025-04-01"));
        assert_eq!(series[11].total, 200_000);
        assert_eq!(series[14].total, 200_000);
        assert_eq!(series[9].total, 0, "income is not charted");
        assert_eq!(series.iter().map(|row| row.total).sum::<i64>(), 400_000);
        assert_eq!(QueryService::monthly_expense_total(&ledger, april), 400_000);
    }

    #[test]
    fn month_listing_is_newest_first_and_stable() {
        let ledger = sample_ledger();
        let april: Month = "2025-04".parse().unwrap();
        let ids: Vec<_> = QueryService::transactions_in_month(&ledger, april)
            .iter()
            .map(|txn| txn.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "5", "4"]);

        let on_day: Vec<_> = QueryService::transactions_on(&ledger, date("2025-04-12"))
            .iter()
            .map(|txn| txn.id.as_str())
            .collect();
        assert_eq!(on_day, ["3", "5"]);
    }

    #[test]
    fn budget_totals_sum_over_all_budgets() {
        let mut ledger = sample_ledger();
        BudgetService::add(
            &mut ledger,
            NewBudget::new("food", "Food", 2_000_000, date("2025-04-01"), date("2025-04-30")),
        )
        .unwrap();
        BudgetService::add(
            &mut ledger,
            NewBudget::new("shop", "Shopping", 100_000, date("2025-04-01"), date("2025-04-30")),
        )
        .unwrap();
        TransactionService::remove(&mut ledger, "missing", BudgetSyncPolicy::Strict);

        assert_eq!(QueryService::total_budget_amount(&ledger), 2_100_000);
        assert_eq!(QueryService::total_spent_amount(&ledger), 400_000);
        assert_eq!(QueryService::remaining_amount(&ledger), 1_700_000);

        let progress = QueryService::budget_progress(&ledger);
        assert!((progress[0].progress - 10.0).abs() < 1e-9);
        assert!((progress[1].progress - 200.0).abs() < 1e-9);
        assert_eq!(progress[1].remaining, -100_000);
    }
}
