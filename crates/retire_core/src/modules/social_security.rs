//! Social Security benefit cashflow, taxed per the provisional-income test.

use crate::input_builder::active_strategies;
use crate::model::{CashflowCategory, CashflowItem, SimulationContext, SimulationState, TaggedCashflowItem};

use super::Module;

pub struct SocialSecurityModule;

impl Module for SocialSecurityModule {
    fn name(&self) -> &'static str {
        "social-security"
    }

    fn get_cashflows(
        &self,
        state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        let mut flows = Vec::new();
        for strategy in active_strategies(ctx.snapshot) {
            let Some(ss) = &strategy.social_security else {
                continue;
            };
            if ctx.date < ss.start_date {
                continue;
            }

            // Provisional income = other ordinary income this year so far +
            // tax-exempt income + half the annual benefit.
            let annual_benefit = ss.monthly_benefit * 12.0;
            let provisional_income = state.year_ledger.ordinary_income
                + state.year_ledger.tax_exempt_income
                + annual_benefit / 2.0;
            let taxable_pct = ctx
                .snapshot
                .reference
                .ss_provisional_income_brackets
                .taxable_pct(provisional_income);

            flows.push(
                CashflowItem::new(CashflowCategory::Ssa, ss.monthly_benefit)
                    .with_ordinary_income(ss.monthly_benefit * taxable_pct)
                    .with_tax_exempt_income(ss.monthly_benefit * (1.0 - taxable_pct)),
            );
        }
        flows
    }
}
