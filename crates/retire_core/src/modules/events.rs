//! One-time cashflow events (windfalls, large purchases, gifts) fired on
//! their configured date.

use crate::input_builder::active_strategies;
use crate::model::{
    CashflowCategory, CashflowItem, SimulationContext, SimulationState, TaggedCashflowItem,
    TaxTreatment,
};

use super::Module;

pub struct EventsModule;

impl Module for EventsModule {
    fn name(&self) -> &'static str {
        "events"
    }

    fn get_cashflows(
        &self,
        _state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        let mut flows = Vec::new();
        for strategy in active_strategies(ctx.snapshot) {
            for event in &strategy.events {
                if event.date.year() != ctx.date.year() || event.date.month() != ctx.date.month() {
                    continue;
                }
                let item = CashflowItem::new(CashflowCategory::Event, event.amount);
                flows.push(match event.tax_treatment {
                    TaxTreatment::Ordinary => item.with_ordinary_income(event.amount),
                    TaxTreatment::TaxExempt => item.with_tax_exempt_income(event.amount),
                    TaxTreatment::CapitalGains => item.with_capital_gains(event.amount),
                    TaxTreatment::None => item,
                });
            }
        }
        flows
    }
}
