use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{ensure_not_blank, ensure_positive, Displayable, Identifiable};
use crate::errors::LedgerError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(LedgerError::Validation(format!(
                "unknown transaction type `{}`",
                other
            ))),
        }
    }
}

/// A single income or expense record.
///
/// For income the `title` doubles as its category label; `category` is only
/// meaningful for expenses that should count against a budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub title: String,
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        title: impl Into<String>,
        amount: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            amount,
            date,
            category: None,
        }
    }

    pub fn income(id: impl Into<String>, title: impl Into<String>, amount: i64, date: NaiveDate) -> Self {
        Self::new(id, TransactionKind::Income, title, amount, date)
    }

    pub fn expense(id: impl Into<String>, title: impl Into<String>, amount: i64, date: NaiveDate) -> Self {
        Self::new(id, TransactionKind::Expense, title, amount, date)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Signed effect on the balance: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        ensure_not_blank("transaction id", &self.id)?;
        ensure_not_blank("transaction title", &self.title)?;
        ensure_positive("transaction amount", self.amount)?;
        if let Some(category) = self.category.as_deref() {
            ensure_not_blank("transaction category", category)?;
        }
        Ok(())
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("txn:{} [{}] {}", self.id, self.kind, self.title)
    }
}

/// Field overwrites accepted by `update_transaction`; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn amount(amount: i64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn has_effect(&self) -> bool {
        self.kind.is_some()
            || self.title.is_some()
            || self.amount.is_some()
            || self.date.is_some()
            || self.category.is_some()
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(title) = self.title.as_deref() {
            ensure_not_blank("transaction title", title)?;
        }
        if let Some(amount) = self.amount {
            ensure_positive("transaction amount", amount)?;
        }
        if let Some(Some(category)) = self.category.as_ref() {
            ensure_not_blank("transaction category", category)?;
        }
        Ok(())
    }

    pub fn apply_to(self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        if let Some(title) = self.title {
            transaction.title = title;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(category) = self.category {
            transaction.category = category;
        }
    }
}
