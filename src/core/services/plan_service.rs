use tracing::debug;

use crate::core::services::ServiceResult;
use crate::domain::plan::{Plan, PlanPatch};
use crate::errors::LedgerError;
use crate::ledger::Ledger;

/// CRUD helpers for savings plans.
pub struct PlanService;

impl PlanService {
    pub fn add(ledger: &mut Ledger, plan: Plan) -> ServiceResult<String> {
        plan.validate()?;
        if ledger.plan(&plan.id).is_some() {
            return Err(LedgerError::duplicate("plan", plan.id));
        }
        let id = plan.id.clone();
        debug!(id = %id, target = plan.target, "plan added");
        ledger.plans.push(plan);
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: &str, patch: PlanPatch) -> ServiceResult<()> {
        patch.validate()?;
        let plan = ledger
            .plan_mut(id)
            .ok_or_else(|| LedgerError::not_found("plan", id))?;
        patch.apply_to(plan);
        debug!(id, "plan updated");
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: &str) -> Option<Plan> {
        ledger.remove_plan(id)
    }

    pub fn list(ledger: &Ledger) -> &[Plan] {
        &ledger.plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn vacation() -> Plan {
        Plan::new(
            "p1",
            "Save for vacation",
            5_000_000,
            15_000_000,
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        )
    }

    #[test]
    fn plan_crud_roundtrip() {
        let mut ledger = Ledger::new();
        PlanService::add(&mut ledger, vacation()).unwrap();

        let patch = PlanPatch {
            current: Some(7_500_000),
            ..PlanPatch::default()
        };
        PlanService::update(&mut ledger, "p1", patch).unwrap();
        let plan = ledger.plan("p1").unwrap();
        assert_eq!(plan.current, 7_500_000);
        assert!((plan.progress() - 50.0).abs() < f64::EPSILON);

        assert!(PlanService::remove(&mut ledger, "p1").is_some());
        assert!(PlanService::list(&ledger).is_empty());
    }

    #[test]
    fn plan_requires_positive_target() {
        let mut ledger = Ledger::new();
        let mut plan = vacation();
        plan.target = 0;
        assert!(matches!(
            PlanService::add(&mut ledger, plan),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn updating_missing_plan_fails() {
        let mut ledger = Ledger::new();
        let err = PlanService::update(&mut ledger, "p9", PlanPatch::default()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "plan", .. }));
    }
}
