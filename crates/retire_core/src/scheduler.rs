//! The Month Scheduler: the driver that advances a [`SimulationState`]
//! across the run's months, invoking module hooks in a fixed order,
//! resolving cashflows and intents, and emitting the run's timeline.
//!
//! Grounded on the teacher's `simulate_with_scratch`/`advance_time` loop in
//! `finplan_core/src/simulation.rs`, generalized from its event-driven
//! continuous-time advance to a fixed monthly step over a static, ordered
//! module registry.

use rustc_hash::FxHashMap;

use crate::date_math::add_months;
use crate::input_builder::{build_input, SimulationInput};
use crate::model::{
    AccountBalanceSnapshot, ActionIntent, ActionRecord, CashflowCategory, HoldingTaxType,
    ModuleRunExplanation, MonthExplanation, MonthlyRecord, RunSummary, SimulationContext,
    SimulationResult, SimulationSettings, SimulationSnapshot, SimulationState, TaggedCashflowItem,
    YearRecord,
};
use crate::modules::{build_module_registry, MarketReturn, Module};
use crate::tax_lot;
use crate::error::Result;

/// Options narrowing what a run computes and records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Random seed for stochastic market returns. `None` runs the
    /// deterministic `return_rate` path.
    pub seed: Option<u64>,
    /// Skip per-month explanation assembly, per spec.md's `summaryOnly`.
    pub summary_only: bool,
}

/// Run one simulation from a snapshot and start date, producing the full
/// timeline (unless `options.summary_only`).
pub fn run_simulation(
    snapshot: &SimulationSnapshot,
    start_date: jiff::civil::Date,
    options: RunOptions,
) -> Result<SimulationResult> {
    let SimulationInput { snapshot, settings } = build_input(snapshot, start_date)?;
    Ok(run_with_settings(snapshot, &settings, options))
}

fn run_with_settings(
    snapshot: &SimulationSnapshot,
    settings: &SimulationSettings,
    options: RunOptions,
) -> SimulationResult {
    let modules = build_module_registry(options.seed);
    let mut state = SimulationState::from_snapshot(snapshot);

    let mut monthly_timeline = Vec::with_capacity(settings.months as usize);
    let mut explanations = Vec::new();
    let mut year_months: Vec<MonthlyRecord> = Vec::new();
    let mut timeline = Vec::new();
    let mut guardrail_factors: Vec<f64> = Vec::new();

    let primary_person = snapshot.people.first();

    for month_index in 0..settings.months {
        let date = add_months(settings.start_date, month_index as i32);
        let year_index = month_index / 12;
        let is_start_of_year = month_index % 12 == 0;
        let is_end_of_year = month_index % 12 == 11 || month_index + 1 >= settings.months;

        let age = primary_person
            .map(|p| crate::date_math::age_in_years_at_date(p.date_of_birth, date))
            .unwrap_or(0.0);

        let ctx = SimulationContext {
            snapshot,
            settings,
            month_index,
            year_index,
            age,
            date,
            is_start_of_year,
            is_end_of_year,
        };

        if is_start_of_year {
            state.year_ledger.reset();
            for m in &modules {
                m.on_start_of_year(&mut state, &ctx);
            }
        }

        for m in &modules {
            m.on_start_of_month(&mut state, &ctx);
        }

        let base_cashflows = collect_and_apply_cashflows(&modules, &mut state, &ctx);

        for m in &modules {
            let extra = m.on_after_cashflows(&base_cashflows, &state, &ctx);
            apply_cashflows(&mut state, &extra);
        }

        let raw_intents: Vec<(usize, ActionIntent)> = modules
            .iter()
            .enumerate()
            .flat_map(|(i, m)| {
                m.get_action_intents(&state, &ctx)
                    .into_iter()
                    .map(move |intent| (i, intent))
            })
            .collect();

        let mut ordered: Vec<usize> = (0..raw_intents.len()).collect();
        ordered.sort_by_key(|&i| raw_intents[i].1.priority());

        let mut actions_by_module: Vec<Vec<ActionRecord>> = vec![Vec::new(); modules.len()];
        for idx in ordered {
            let (module_idx, intent) = raw_intents[idx];
            let resolved = tax_lot::resolve_intent_amount(&intent, &state);
            let record = tax_lot::execute_intent(
                &mut state,
                intent,
                resolved,
                ctx.age,
                ctx.date,
                snapshot.reference.early_withdrawal_penalty_rate,
            );
            actions_by_module[module_idx].push(record);
        }

        for (i, m) in modules.iter().enumerate() {
            if !actions_by_module[i].is_empty() {
                m.on_actions_resolved(&actions_by_module[i], &mut state, &ctx);
            }
        }

        for m in &modules {
            m.on_end_of_month(&mut state, &ctx);
        }

        let market_returns: Vec<MarketReturn> = modules
            .iter()
            .find_map(|m| m.produce_market_returns(&mut state))
            .unwrap_or_default();
        if !market_returns.is_empty() {
            for m in &modules {
                m.on_market_returns(&market_returns, &mut state, &ctx);
            }
        }

        // Every module's `explain()` is cheap (cached totals, no allocation
        // beyond a small Vec), so it runs unconditionally: the guardrail
        // factor it carries feeds the summary's guardrail statistics even in
        // `summary_only` mode, where the full per-month trace is dropped.
        let module_explanations: Vec<ModuleRunExplanation> =
            modules.iter().map(|m| m.explain()).collect();
        if let Some(factor) = module_explanations
            .iter()
            .find(|e| e.module_name == "spending")
            .and_then(|e| e.guardrail_factor)
        {
            guardrail_factors.push(factor);
        }
        if !options.summary_only {
            let balances = account_balance_snapshots(&state, ctx.date);
            explanations.push(MonthExplanation {
                month_index,
                modules: module_explanations,
                balances,
            });
        }

        let record = build_monthly_record(&state, &ctx, &base_cashflows, &actions_by_module);
        state.min_balance = state.min_balance.min(record.total_balance);
        state.max_balance = state.max_balance.max(record.total_balance);
        year_months.push(record.clone());
        monthly_timeline.push(record);

        if is_end_of_year {
            for m in &modules {
                m.on_end_of_year(&mut state, &ctx);
            }
            state.prior_year_end_balances = state
                .holdings
                .iter()
                .map(|h| (h.id, h.balance))
                .collect::<FxHashMap<_, _>>();
            if let Some(year_record) = YearRecord::from_months(year_index, &year_months) {
                timeline.push(year_record);
            }
            year_months.clear();
        }
    }

    let summary = build_summary(&monthly_timeline, &guardrail_factors);

    SimulationResult {
        timeline,
        monthly_timeline,
        explanations: if options.summary_only {
            None
        } else {
            Some(explanations)
        },
        summary,
    }
}

/// Collect every module's `get_cashflows` in registry order and apply each
/// one immediately so later modules (notably `taxes`, which runs last) see
/// the year-to-date ledger including this month's earlier contributions.
fn collect_and_apply_cashflows(
    modules: &[Box<dyn Module>],
    state: &mut SimulationState,
    ctx: &SimulationContext,
) -> Vec<TaggedCashflowItem> {
    let mut all = Vec::new();
    for m in modules {
        let flows = m.get_cashflows(state, ctx);
        apply_cashflows(state, &flows);
        all.extend(flows);
    }
    all
}

/// Credit `item.cash` to the primary cash account and accumulate its tax
/// fields into the year ledger, per the Data Model's overdraft invariant
/// (only the first cash account absorbs a transient negative balance).
fn apply_cashflows(state: &mut SimulationState, flows: &[TaggedCashflowItem]) {
    for flow in flows {
        state.adjust_primary_cash(flow.item.cash);
        state.year_ledger.ordinary_income += flow.item.ordinary_income;
        state.year_ledger.capital_gains += flow.item.capital_gains;
        state.year_ledger.deductions += flow.item.deductions;
        state.year_ledger.tax_exempt_income += flow.item.tax_exempt_income;
        if flow.category == CashflowCategory::Work && flow.item.cash > 0.0 {
            state.year_ledger.earned_income += flow.item.cash;
        }
        if flow.category == CashflowCategory::Tax && flow.item.cash < 0.0 {
            state.year_ledger.tax_paid += -flow.item.cash;
        }
    }
}

fn account_balance_snapshots(state: &SimulationState, date: jiff::civil::Date) -> Vec<AccountBalanceSnapshot> {
    let mut out = Vec::with_capacity(state.cash_accounts.len() + state.holdings.len());
    for acct in &state.cash_accounts {
        out.push(AccountBalanceSnapshot {
            holding_id: None,
            balance: acct.balance,
            seasoned_basis: 0.0,
            unseasoned_basis: 0.0,
        });
    }
    for holding in &state.holdings {
        let (seasoned, unseasoned) = if holding.tax_type == HoldingTaxType::Roth {
            let seasoned = holding.seasoned_basis(date);
            (seasoned, (holding.total_basis() - seasoned).max(0.0))
        } else {
            (0.0, 0.0)
        };
        out.push(AccountBalanceSnapshot {
            holding_id: Some(holding.id),
            balance: holding.balance,
            seasoned_basis: seasoned,
            unseasoned_basis: unseasoned,
        });
    }
    out
}

fn build_monthly_record(
    state: &SimulationState,
    ctx: &SimulationContext,
    cashflows: &[TaggedCashflowItem],
    actions_by_module: &[Vec<ActionRecord>],
) -> MonthlyRecord {
    let mut income = 0.0;
    let mut spending = 0.0;
    let mut taxes = 0.0;
    for flow in cashflows {
        match flow.category {
            CashflowCategory::Work
            | CashflowCategory::Pension
            | CashflowCategory::Ssa
            | CashflowCategory::Interest
            | CashflowCategory::Event
            | CashflowCategory::Other => {
                if flow.item.cash > 0.0 {
                    income += flow.item.cash;
                } else {
                    spending += -flow.item.cash;
                }
            }
            CashflowCategory::SpendingNeed
            | CashflowCategory::SpendingWant
            | CashflowCategory::SpendingHealthcare => spending += -flow.item.cash,
            CashflowCategory::Tax => taxes += -flow.item.cash,
        }
    }

    let mut contributions = 0.0;
    let mut withdrawals = 0.0;
    for actions in actions_by_module {
        for action in actions {
            match action.intent {
                ActionIntent::Deposit { .. } => contributions += action.resolved_amount,
                ActionIntent::Withdraw { .. } => withdrawals += action.resolved_amount,
                ActionIntent::Convert { .. } => {}
            }
        }
    }

    MonthlyRecord {
        month_index: ctx.month_index,
        date: ctx.date,
        age: ctx.age,
        income,
        spending,
        contributions,
        withdrawals,
        taxes,
        ordinary_income: state.year_ledger.ordinary_income,
        capital_gains: state.year_ledger.capital_gains,
        deductions: state.year_ledger.deductions,
        cash_balance: state.cash_balance(),
        investment_balance: state.investment_balance(),
        total_balance: state.total_balance(),
    }
}

fn build_summary(monthly_timeline: &[MonthlyRecord], guardrail_factors: &[f64]) -> RunSummary {
    let ending_balance = monthly_timeline.last().map(|m| m.total_balance).unwrap_or(0.0);
    let min_balance = monthly_timeline
        .iter()
        .map(|m| m.total_balance)
        .fold(f64::INFINITY, f64::min);
    let max_balance = monthly_timeline
        .iter()
        .map(|m| m.total_balance)
        .fold(f64::NEG_INFINITY, f64::max);

    let (guardrail_factor_avg, guardrail_factor_min, guardrail_factor_below_pct) =
        if guardrail_factors.is_empty() {
            (None, None, None)
        } else {
            let sum: f64 = guardrail_factors.iter().sum();
            let avg = sum / guardrail_factors.len() as f64;
            let min = guardrail_factors.iter().copied().fold(f64::INFINITY, f64::min);
            let below_count = guardrail_factors.iter().filter(|&&f| f < 1.0).count();
            let below_pct = below_count as f64 / guardrail_factors.len() as f64;
            (Some(avg), Some(min), Some(below_pct))
        };

    RunSummary {
        ending_balance,
        min_balance: if min_balance.is_finite() { min_balance } else { 0.0 },
        max_balance: if max_balance.is_finite() { max_balance } else { 0.0 },
        guardrail_factor_avg,
        guardrail_factor_min,
        guardrail_factor_below_pct,
    }
}
