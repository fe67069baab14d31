//! Required Minimum Distributions, computed once a year against the prior
//! year-end balance of each configured holding and routed per
//! [`RmdExcessHandling`].

use crate::input_builder::active_strategies;
use crate::model::{
    ActionIntent, ActionRecord, HoldingTaxType, RmdExcessHandling, SimulationContext,
    SimulationState, TaxTreatment,
};

use super::Module;

pub struct RmdModule;

impl Module for RmdModule {
    fn name(&self) -> &'static str {
        "rmd"
    }

    fn get_action_intents(
        &self,
        state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<ActionIntent> {
        if !ctx.is_start_of_year {
            return Vec::new();
        }

        let mut intents = Vec::new();
        for strategy in active_strategies(ctx.snapshot) {
            let Some(rmd) = &strategy.rmd else {
                continue;
            };
            if ctx.age < rmd.start_age as f64 {
                continue;
            }
            let age_key = (ctx.age.floor() as u8).min(120).max(rmd.start_age);
            let Some(divisor) = ctx.snapshot.reference.rmd_table.divisor_for_age(age_key) else {
                continue;
            };

            for &holding_id in &rmd.account_holding_ids {
                let prior_balance = state
                    .prior_year_end_balances
                    .get(&holding_id)
                    .copied()
                    .unwrap_or(0.0);
                if prior_balance <= 0.0 {
                    continue;
                }
                let required = prior_balance / divisor;
                intents.push(ActionIntent::Withdraw {
                    amount: required,
                    priority: -10,
                    source_holding_id: Some(holding_id),
                    tax_treatment: Some(TaxTreatment::Ordinary),
                    skip_penalty: true,
                });
            }
        }
        intents
    }

    fn on_actions_resolved(
        &self,
        actions: &[ActionRecord],
        state: &mut SimulationState,
        ctx: &SimulationContext,
    ) {
        if !ctx.is_start_of_year {
            return;
        }
        for strategy in active_strategies(ctx.snapshot) {
            let Some(rmd) = &strategy.rmd else { continue };
            if matches!(rmd.excess_handling, RmdExcessHandling::Spend) {
                continue;
            }
            for action in actions {
                let ActionIntent::Withdraw {
                    source_holding_id: Some(source_id),
                    ..
                } = action.intent
                else {
                    continue;
                };
                if !rmd.account_holding_ids.contains(&source_id) || action.resolved_amount <= 0.0 {
                    continue;
                }

                let target_tax_type = match rmd.excess_handling {
                    RmdExcessHandling::Taxable => HoldingTaxType::Taxable,
                    RmdExcessHandling::Roth => HoldingTaxType::Roth,
                    RmdExcessHandling::Spend => unreachable!(),
                };
                let target = state
                    .holdings
                    .iter()
                    .find(|h| h.tax_type == target_tax_type)
                    .map(|h| h.id);
                crate::tax_lot::deposit(state, target, action.resolved_amount, false, ctx.date);
            }
        }
    }
}
