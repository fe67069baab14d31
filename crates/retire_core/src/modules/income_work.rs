//! Salary, bonus, and tax-advantaged contributions for active work periods.

use crate::input_builder::active_strategies;
use crate::model::{
    ActionIntent, ActionRecord, CashflowCategory, CashflowItem, ContributionKind,
    SimulationContext, SimulationState, TaggedCashflowItem,
};

use super::Module;

pub struct IncomeWorkModule;

/// One deposit intent tagged with which annual limit it draws against.
struct PendingContribution {
    holding_id: crate::model::HoldingId,
    kind: ContributionKind,
    amount: f64,
    priority: i32,
}

impl IncomeWorkModule {
    fn pending_contributions(
        &self,
        state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<PendingContribution> {
        let mut out = Vec::new();
        let Some(limits) = ctx
            .snapshot
            .reference
            .contribution_limits
            .for_year(ctx.date.year())
        else {
            return out;
        };

        for strategy in active_strategies(ctx.snapshot) {
            for period in &strategy.work_periods {
                if ctx.date < period.start || ctx.date > period.end {
                    continue;
                }

                if let Some(holding_id) = period.traditional_401k_holding_id {
                    let employee_amount =
                        period.monthly_salary * period.employee_401k_contribution_rate;
                    let employee_remaining = self.remaining_limit(
                        state,
                        holding_id,
                        ContributionKind::Employee401k,
                        limits.employee_401k + limits.catch_up_50 * (ctx.age >= 50.0) as i32 as f64,
                    );
                    if employee_amount > 0.0 {
                        out.push(PendingContribution {
                            holding_id,
                            kind: ContributionKind::Employee401k,
                            amount: employee_amount.min(employee_remaining),
                            priority: -20,
                        });
                    }

                    let employer_amount =
                        period.monthly_salary * period.employer_401k_match_rate;
                    let employer_remaining = self.remaining_limit(
                        state,
                        holding_id,
                        ContributionKind::Employer401k,
                        limits.employer_401k,
                    );
                    if employer_amount > 0.0 {
                        out.push(PendingContribution {
                            holding_id,
                            kind: ContributionKind::Employer401k,
                            amount: employer_amount.min(employer_remaining),
                            priority: -20,
                        });
                    }
                }

                if let Some(hsa_id) = period.hsa_holding_id {
                    let hsa_remaining =
                        self.remaining_limit(state, hsa_id, ContributionKind::Hsa, limits.hsa_self);
                    if period.hsa_monthly_contribution > 0.0 {
                        out.push(PendingContribution {
                            holding_id: hsa_id,
                            kind: ContributionKind::Hsa,
                            amount: period.hsa_monthly_contribution.min(hsa_remaining),
                            priority: -20,
                        });
                    }
                }
            }
        }
        out
    }

    fn remaining_limit(
        &self,
        state: &SimulationState,
        holding_id: crate::model::HoldingId,
        kind: ContributionKind,
        annual_limit: f64,
    ) -> f64 {
        let used = state
            .ytd_contributions
            .get(&(holding_id, kind))
            .copied()
            .unwrap_or(0.0);
        (annual_limit - used).max(0.0)
    }
}

impl Module for IncomeWorkModule {
    fn name(&self) -> &'static str {
        "income-work"
    }

    fn get_cashflows(
        &self,
        _state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        let mut flows = Vec::new();
        for strategy in active_strategies(ctx.snapshot) {
            for period in &strategy.work_periods {
                if ctx.date < period.start || ctx.date > period.end {
                    continue;
                }
                let gross = period.monthly_salary + period.monthly_bonus;
                if gross <= 0.0 {
                    continue;
                }
                flows.push(
                    CashflowItem::new(CashflowCategory::Work, gross)
                        .with_ordinary_income(gross),
                );
            }
        }
        flows
    }

    fn get_action_intents(
        &self,
        state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<ActionIntent> {
        self.pending_contributions(state, ctx)
            .into_iter()
            .filter(|c| c.amount > 0.0)
            .map(|c| ActionIntent::Deposit {
                amount: c.amount,
                priority: c.priority,
                target_holding_id: Some(c.holding_id),
                from_cash: !matches!(c.kind, ContributionKind::Employer401k),
            })
            .collect()
    }

    fn on_actions_resolved(
        &self,
        actions: &[ActionRecord],
        state: &mut SimulationState,
        ctx: &SimulationContext,
    ) {
        let pending = self.pending_contributions(state, ctx);
        for (action, pending) in actions.iter().zip(pending.iter()) {
            if let ActionIntent::Deposit {
                target_holding_id: Some(holding_id),
                ..
            } = action.intent
            {
                if holding_id == pending.holding_id {
                    *state
                        .ytd_contributions
                        .entry((holding_id, pending.kind))
                        .or_insert(0.0) += action.resolved_amount;
                }
            }
        }
    }
}
