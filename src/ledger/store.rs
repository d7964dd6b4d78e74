use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::services::{
    BudgetService, BudgetSyncPolicy, DailyExpense, PlanService, QueryService, SearchMode,
    TransactionService,
};
use crate::core::{Clock, IdGenerator, SystemClock, TimestampIdGenerator};
use crate::domain::{
    Budget, BudgetPatch, BudgetProgress, Month, NewBudget, Plan, PlanPatch, Transaction,
    TransactionKind, TransactionPatch,
};
use crate::errors::{LedgerError, Result};
use crate::storage::SnapshotStore;

use super::ledger::{ledger_warnings, Ledger, Selection};

/// Behavioral switches for a [`LedgerStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub search_mode: SearchMode,
    pub budget_sync: BudgetSyncPolicy,
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            search_mode: config.search_mode,
            budget_sync: config.budget_sync,
        }
    }
}

/// Owns one [`Ledger`] and exposes the command/query surface used by front-ends.
///
/// Every command either applies fully or returns an error with the state untouched.
pub struct LedgerStore {
    ledger: Ledger,
    options: StoreOptions,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl LedgerStore {
    pub fn new(options: StoreOptions) -> Self {
        Self::with_collaborators(
            Ledger::new(),
            options,
            Box::new(TimestampIdGenerator::new()),
            Box::new(SystemClock),
        )
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(StoreOptions::from(config))
    }

    pub fn with_collaborators(
        ledger: Ledger,
        options: StoreOptions,
        ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            options,
            ids,
            clock,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn set_options(&mut self, options: StoreOptions) {
        self.options = options;
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Serializable copy of the entire state.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.clone()
    }

    pub fn next_id(&mut self) -> String {
        self.ids.next_id()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn default_chart_month(&self) -> Month {
        Month::containing(self.today())
    }

    // Transactions

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<String> {
        TransactionService::add(&mut self.ledger, transaction)
    }

    /// Records a new transaction under a freshly generated id.
    pub fn record(
        &mut self,
        kind: TransactionKind,
        title: impl Into<String>,
        amount: i64,
        date: NaiveDate,
        category: Option<String>,
    ) -> Result<String> {
        let mut transaction = Transaction::new(self.next_id(), kind, title, amount, date);
        transaction.category = category;
        self.add_transaction(transaction)
    }

    pub fn update_transaction(&mut self, id: &str, patch: TransactionPatch) -> Result<()> {
        TransactionService::update(&mut self.ledger, id, patch, self.options.budget_sync)
    }

    /// Deletes a transaction; unknown ids are a no-op and return `None`.
    pub fn delete_transaction(&mut self, id: &str) -> Option<Transaction> {
        TransactionService::remove(&mut self.ledger, id, self.options.budget_sync)
    }

    // Budgets

    pub fn add_budget(&mut self, budget: NewBudget) -> Result<String> {
        BudgetService::add(&mut self.ledger, budget)
    }

    pub fn create_budget(
        &mut self,
        category: impl Into<String>,
        amount: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<String> {
        let budget = NewBudget::new(self.next_id(), category, amount, start_date, end_date);
        self.add_budget(budget)
    }

    pub fn update_budget(&mut self, id: &str, patch: BudgetPatch) -> Result<()> {
        BudgetService::update(&mut self.ledger, id, patch)
    }

    pub fn delete_budget(&mut self, id: &str) -> Option<Budget> {
        BudgetService::remove(&mut self.ledger, id)
    }

    // Plans

    pub fn add_plan(&mut self, plan: Plan) -> Result<String> {
        PlanService::add(&mut self.ledger, plan)
    }

    pub fn update_plan(&mut self, id: &str, patch: PlanPatch) -> Result<()> {
        PlanService::update(&mut self.ledger, id, patch)
    }

    pub fn delete_plan(&mut self, id: &str) -> Option<Plan> {
        PlanService::remove(&mut self.ledger, id)
    }

    // Transient UI state

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.ledger.search_query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.ledger.search_query
    }

    pub fn set_selected_income_type(&mut self, income_type: Option<String>) {
        self.ledger.selection.income_type = income_type;
    }

    pub fn set_selected_expense_type(&mut self, expense_type: Option<String>) {
        self.ledger.selection.expense_type = expense_type;
    }

    pub fn set_selected_date(&mut self, date: Option<NaiveDate>) {
        self.ledger.selection.date = date;
    }

    pub fn selection(&self) -> &Selection {
        &self.ledger.selection
    }

    // Queries

    pub fn balance(&self) -> i64 {
        self.ledger.balance
    }

    pub fn income(&self) -> i64 {
        self.ledger.income
    }

    pub fn expense(&self) -> i64 {
        self.ledger.expense
    }

    pub fn transactions(&self) -> &[Transaction] {
        TransactionService::list(&self.ledger)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.ledger.transaction(id)
    }

    pub fn filtered_transactions(&self, query: &str) -> Vec<&Transaction> {
        QueryService::filtered_transactions(&self.ledger, query, self.options.search_mode)
    }

    /// Transactions matching the stored search query.
    pub fn search_results(&self) -> Vec<&Transaction> {
        self.filtered_transactions(&self.ledger.search_query)
    }

    pub fn budgets(&self) -> &[Budget] {
        BudgetService::list(&self.ledger)
    }

    pub fn budget(&self, id: &str) -> Option<&Budget> {
        self.ledger.budget(id)
    }

    pub fn budget_progress(&self) -> Vec<BudgetProgress> {
        QueryService::budget_progress(&self.ledger)
    }

    pub fn total_budget_amount(&self) -> i64 {
        QueryService::total_budget_amount(&self.ledger)
    }

    pub fn total_spent_amount(&self) -> i64 {
        QueryService::total_spent_amount(&self.ledger)
    }

    pub fn remaining_amount(&self) -> i64 {
        QueryService::remaining_amount(&self.ledger)
    }

    pub fn daily_expenses(&self, month: Month) -> Vec<DailyExpense> {
        QueryService::daily_expense_series(&self.ledger, month)
    }

    pub fn monthly_expense_total(&self, month: Month) -> i64 {
        QueryService::monthly_expense_total(&self.ledger, month)
    }

    pub fn transactions_in_month(&self, month: Month) -> Vec<&Transaction> {
        QueryService::transactions_in_month(&self.ledger, month)
    }

    pub fn transactions_on(&self, date: NaiveDate) -> Vec<&Transaction> {
        QueryService::transactions_on(&self.ledger, date)
    }

    pub fn plans(&self) -> &[Plan] {
        PlanService::list(&self.ledger)
    }

    // Persistence

    pub fn save_to(&self, store: &dyn SnapshotStore, key: &str) -> Result<()> {
        store.save(key, &self.ledger)?;
        info!(key, transactions = self.ledger.transactions.len(), "ledger saved");
        Ok(())
    }

    /// Loads and installs a snapshot, returning any repairs that were needed.
    pub fn load_from(&mut self, store: &dyn SnapshotStore, key: &str) -> Result<Vec<String>> {
        let ledger = store.load(key)?;
        let warnings = self.restore(ledger)?;
        info!(key, warnings = warnings.len(), "ledger loaded");
        Ok(warnings)
    }

    /// Replaces the current state with `ledger`.
    ///
    /// Malformed records or colliding ids reject the snapshot outright. Running
    /// totals and spent amounts that disagree with the records are re-derived and
    /// each discrepancy is returned as a warning.
    pub fn restore(&mut self, mut ledger: Ledger) -> Result<Vec<String>> {
        check_structure(&ledger)?;
        let warnings = ledger_warnings(&ledger);
        if !warnings.is_empty() {
            for message in &warnings {
                warn!(%message, "repairing snapshot");
            }
            if let Some(summed) = ledger.summed_totals() {
                ledger.set_totals(summed);
            }
            BudgetService::recompute_all(&mut ledger);
        }
        self.ledger = ledger;
        Ok(warnings)
    }
}

fn check_structure(ledger: &Ledger) -> Result<()> {
    let reject = |err: LedgerError| LedgerError::Storage(format!("snapshot rejected: {}", err));

    let mut seen = HashSet::new();
    for txn in &ledger.transactions {
        txn.validate().map_err(reject)?;
        if !seen.insert(txn.id.as_str()) {
            return Err(reject(LedgerError::duplicate("transaction", txn.id.as_str())));
        }
    }
    if ledger.summed_totals().is_none() {
        return Err(reject(LedgerError::overflow()));
    }

    seen.clear();
    for budget in &ledger.budgets {
        let definition = NewBudget::new(
            budget.id.as_str(),
            budget.category.as_str(),
            budget.amount,
            budget.start_date,
            budget.end_date,
        );
        definition.validate().map_err(reject)?;
        if !seen.insert(budget.id.as_str()) {
            return Err(reject(LedgerError::duplicate("budget", budget.id.as_str())));
        }
    }

    seen.clear();
    for plan in &ledger.plans {
        plan.validate().map_err(reject)?;
        if !seen.insert(plan.id.as_str()) {
            return Err(reject(LedgerError::duplicate("plan", plan.id.as_str())));
        }
    }
    Ok(())
}
