//! End-of-year federal/state tax settlement and IRMAA surcharge.
//!
//! Runs last in the module registry so its `get_cashflows` (gated to the
//! last month of the year) sees the full year's `YearLedger`, already
//! updated by every earlier module this month via sequential cashflow
//! application. `on_end_of_year` then writes MAGI for the year, consulted
//! two years later by IRMAA lookups (here and in the roth-conversion
//! module).

use std::cell::RefCell;

use crate::input_builder::active_strategies;
use crate::model::{CashflowCategory, CashflowItem, ModuleRunExplanation, SimulationContext, SimulationState, TaggedCashflowItem};
use crate::taxes::{federal_tax_due, state_tax_due};

use super::Module;

#[derive(Debug, Clone, Copy, Default)]
struct YearTaxResult {
    tax_due: f64,
    irmaa_surcharge: f64,
}

#[derive(Default)]
pub struct TaxesModule {
    year: RefCell<Option<YearTaxResult>>,
}

impl TaxesModule {
    fn compute(&self, state: &SimulationState, ctx: &SimulationContext) -> YearTaxResult {
        let Some(strategy) = active_strategies(ctx.snapshot).into_iter().next() else {
            return YearTaxResult::default();
        };

        let ledger = &state.year_ledger;
        let policy = &ctx.snapshot.reference.federal_tax_policy;
        let federal = federal_tax_due(
            ledger.ordinary_income,
            ledger.deductions,
            ledger.capital_gains,
            policy,
        );
        let taxable_ordinary =
            (ledger.ordinary_income - ledger.deductions - policy.standard_deduction).max(0.0);
        let state_tax = state_tax_due(taxable_ordinary, ledger.capital_gains, strategy.tax.state_rate);

        let magi_two_years_back = state.magi_history.get(ctx.date.year() - 2).unwrap_or(0.0);
        let (part_b, part_d) = ctx
            .snapshot
            .reference
            .irmaa_table
            .surcharge_for_magi(magi_two_years_back);
        let irmaa_surcharge = (part_b + part_d) * 12.0;

        YearTaxResult {
            tax_due: federal + state_tax + irmaa_surcharge,
            irmaa_surcharge,
        }
    }

    fn magi(state: &SimulationState) -> f64 {
        let ledger = &state.year_ledger;
        (ledger.ordinary_income + ledger.capital_gains + ledger.tax_exempt_income
            - ledger.deductions)
            .max(0.0)
    }
}

impl Module for TaxesModule {
    fn name(&self) -> &'static str {
        "taxes"
    }

    fn get_cashflows(
        &self,
        state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        if !ctx.is_end_of_year {
            return Vec::new();
        }
        let result = self.compute(state, ctx);
        let amount_due = (result.tax_due - state.year_ledger.tax_paid).max(0.0);
        *self.year.borrow_mut() = Some(result);
        if amount_due <= 0.0 {
            return Vec::new();
        }
        vec![CashflowItem::new(CashflowCategory::Tax, -amount_due)]
    }

    fn on_end_of_year(&self, state: &mut SimulationState, ctx: &SimulationContext) {
        let magi = Self::magi(state);
        state.magi_history.record(ctx.date.year(), magi);
    }

    fn explain(&self) -> ModuleRunExplanation {
        let result = self.year.borrow().unwrap_or_default();
        ModuleRunExplanation {
            module_name: self.name(),
            cashflow_total: -result.tax_due,
            note: if result.irmaa_surcharge > 0.0 {
                Some(format!("irmaa surcharge: {:.2}", result.irmaa_surcharge))
            } else {
                None
            },
            ..Default::default()
        }
    }
}
