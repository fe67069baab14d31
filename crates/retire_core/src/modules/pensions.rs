//! Fixed monthly pension payouts with a configured tax treatment.

use crate::input_builder::active_strategies;
use crate::model::{
    CashflowCategory, CashflowItem, SimulationContext, SimulationState, TaggedCashflowItem,
    TaxTreatment,
};

use super::Module;

pub struct PensionsModule;

impl Module for PensionsModule {
    fn name(&self) -> &'static str {
        "pensions"
    }

    fn get_cashflows(
        &self,
        _state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        let mut flows = Vec::new();
        for strategy in active_strategies(ctx.snapshot) {
            for pension in &strategy.pensions {
                if pension.monthly_amount <= 0.0 {
                    continue;
                }
                let item = CashflowItem::new(CashflowCategory::Pension, pension.monthly_amount);
                flows.push(match pension.tax_treatment {
                    TaxTreatment::Ordinary => item.with_ordinary_income(pension.monthly_amount),
                    TaxTreatment::TaxExempt => item.with_tax_exempt_income(pension.monthly_amount),
                    TaxTreatment::CapitalGains => item.with_capital_gains(pension.monthly_amount),
                    TaxTreatment::None => item,
                });
            }
        }
        flows
    }
}
