use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{ensure_not_blank, ensure_positive, Identifiable};
use crate::errors::LedgerError;

/// A savings goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub id: String,
    pub title: String,
    pub current: i64,
    pub target: i64,
    pub deadline: NaiveDate,
}

impl Plan {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        current: i64,
        target: i64,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            current,
            target,
            deadline,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        ensure_not_blank("plan id", &self.id)?;
        ensure_not_blank("plan title", &self.title)?;
        ensure_positive("plan target", self.target)?;
        ensure_saved_amount(self.current)
    }

    pub fn progress(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        self.current as f64 / self.target as f64 * 100.0
    }
}

impl Identifiable for Plan {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

impl PlanPatch {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(title) = self.title.as_deref() {
            ensure_not_blank("plan title", title)?;
        }
        if let Some(target) = self.target {
            ensure_positive("plan target", target)?;
        }
        if let Some(current) = self.current {
            ensure_saved_amount(current)?;
        }
        Ok(())
    }

    pub fn apply_to(self, plan: &mut Plan) {
        if let Some(title) = self.title {
            plan.title = title;
        }
        if let Some(current) = self.current {
            plan.current = current;
        }
        if let Some(target) = self.target {
            plan.target = target;
        }
        if let Some(deadline) = self.deadline {
            plan.deadline = deadline;
        }
    }
}

fn ensure_saved_amount(current: i64) -> Result<(), LedgerError> {
    if current < 0 {
        return Err(LedgerError::Validation(format!(
            "plan current amount must not be negative (got {})",
            current
        )));
    }
    Ok(())
}
