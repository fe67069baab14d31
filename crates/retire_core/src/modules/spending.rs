//! Need/want/healthcare spending with inflation and guardrail adjustment.
//!
//! Needs are never cut; only the want cashflow is subject to a guardrail.
//! Guardrail math is computed once per strategy per month in
//! `on_start_of_month` (the only hook with `&mut` state, needed to advance
//! the Guyton cut counter) and cached for `get_cashflows`/`explain`.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::input_builder::active_strategies;
use crate::model::{
    CashflowCategory, CashflowItem, GuardrailConfig, InflationRates, InflationType,
    ModuleRunExplanation, SimulationContext, SimulationState, StrategyId, TaggedCashflowItem,
};

use super::Module;

#[derive(Debug, Clone, Copy, Default)]
struct StrategyMonthResult {
    need: f64,
    want: f64,
    healthcare: f64,
    guardrail_factor: Option<f64>,
}

#[derive(Default)]
pub struct SpendingModule {
    month: RefCell<FxHashMap<StrategyId, StrategyMonthResult>>,
}

fn inflation_rate(rates: &InflationRates, kind: InflationType) -> f64 {
    match kind {
        InflationType::Cpi => rates.cpi,
        InflationType::Medical => rates.medical,
        InflationType::Housing => rates.housing,
        InflationType::Education => rates.education,
        InflationType::None => 0.0,
    }
}

fn inflate(base: f64, rate: f64, months_elapsed: u32) -> f64 {
    base * (1.0 + rate).powf(months_elapsed as f64 / 12.0)
}

impl SpendingModule {
    fn compute(&self, state: &mut SimulationState, ctx: &SimulationContext) {
        let mut results = FxHashMap::default();

        for strategy in active_strategies(ctx.snapshot) {
            let Some(spending) = &strategy.spending else {
                continue;
            };

            let rates = &ctx.snapshot.reference.inflation_rates;
            let need = inflate(
                spending.monthly_need,
                inflation_rate(rates, spending.need_inflation),
                ctx.month_index,
            );
            let healthcare = inflate(
                spending.monthly_healthcare,
                inflation_rate(rates, spending.healthcare_inflation),
                ctx.month_index,
            );
            let raw_want = inflate(
                spending.monthly_want,
                inflation_rate(rates, spending.want_inflation),
                ctx.month_index,
            );

            let (want, factor) = match &spending.guardrail {
                None => (raw_want, None),
                Some(GuardrailConfig::CapWants { withdrawal_rate_limit }) => {
                    let budget = state.total_balance() * withdrawal_rate_limit / 12.0;
                    let want = raw_want.min((budget - need).max(0.0));
                    let factor = if raw_want > 0.0 { want / raw_want } else { 1.0 };
                    (want, Some(factor))
                }
                Some(GuardrailConfig::PortfolioHealth { target_balance }) => {
                    let health = if *target_balance > 0.0 {
                        state.total_balance() / target_balance
                    } else {
                        1.0
                    };
                    let factor = ctx
                        .snapshot
                        .reference
                        .guardrail_health_points
                        .factor_at(health);
                    (raw_want * factor, Some(factor))
                }
                Some(GuardrailConfig::Guyton {
                    baseline_need,
                    baseline_want,
                    target_balance,
                    trigger_rate_increase,
                    applied_cut,
                    duration_months,
                }) => {
                    let runtime = state.guardrail_state.entry(strategy.id).or_default();
                    let actual_balance = state.total_balance();
                    let current_rate = if actual_balance > 0.0 {
                        (need + raw_want) / actual_balance
                    } else {
                        0.0
                    };
                    let baseline_rate = if *target_balance > 0.0 {
                        (baseline_need + baseline_want) / target_balance
                    } else {
                        0.0
                    };

                    let cutting = if runtime.guyton_remaining_cut_months > 0 {
                        runtime.guyton_remaining_cut_months -= 1;
                        true
                    } else if current_rate > baseline_rate * (1.0 + trigger_rate_increase) {
                        runtime.guyton_remaining_cut_months = duration_months.saturating_sub(1);
                        true
                    } else {
                        false
                    };

                    let factor = if cutting { 1.0 - applied_cut } else { 1.0 };
                    (raw_want * factor, Some(factor))
                }
            };

            results.insert(
                strategy.id,
                StrategyMonthResult {
                    need,
                    want,
                    healthcare,
                    guardrail_factor: factor,
                },
            );
        }

        *self.month.borrow_mut() = results;
    }
}

impl Module for SpendingModule {
    fn name(&self) -> &'static str {
        "spending"
    }

    fn on_start_of_month(&self, state: &mut SimulationState, ctx: &SimulationContext) {
        self.compute(state, ctx);
    }

    fn get_cashflows(
        &self,
        _state: &SimulationState,
        _ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        let mut flows = Vec::new();
        for result in self.month.borrow().values() {
            if result.need > 0.0 {
                flows.push(CashflowItem::new(CashflowCategory::SpendingNeed, -result.need));
            }
            if result.want > 0.0 {
                flows.push(CashflowItem::new(CashflowCategory::SpendingWant, -result.want));
            }
            if result.healthcare > 0.0 {
                flows.push(CashflowItem::new(
                    CashflowCategory::SpendingHealthcare,
                    -result.healthcare,
                ));
            }
        }
        flows
    }

    fn explain(&self) -> ModuleRunExplanation {
        let month = self.month.borrow();
        let cashflow_total: f64 = month
            .values()
            .map(|r| -(r.need + r.want + r.healthcare))
            .sum();
        let guardrail_factor = month
            .values()
            .filter_map(|r| r.guardrail_factor)
            .fold(None, |acc: Option<f64>, f| {
                Some(acc.map_or(f, |a| a.min(f)))
            });
        ModuleRunExplanation {
            module_name: self.name(),
            cashflow_total,
            guardrail_factor,
            ..Default::default()
        }
    }
}
