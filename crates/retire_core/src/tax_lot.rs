//! Tax-lot & Penalty Engine — intent resolution, withdrawal execution with
//! basis consumption, early-withdrawal penalties, pro-rata splitting,
//! deposits and conversions.
//!
//! Grounded on the lot-consumption routines of a liquidation module observed
//! in the retrieval corpus, generalized from per-asset-lot units to the
//! holding-level basis entries this engine tracks.

use jiff::civil::Date;

use crate::model::{
    ActionIntent, ActionRecord, BasisEntry, Holding, HoldingId, HoldingTaxType, LotMethod,
    SimulationState, TaxTreatment,
};

/// Clamp withdraw intents to total available balance; other intents pass
/// through unchanged.
pub fn resolve_intent_amount(intent: &ActionIntent, state: &SimulationState) -> f64 {
    match intent {
        ActionIntent::Withdraw { amount, .. } => {
            let available: f64 = state.holdings.iter().map(|h| h.balance).sum();
            amount.min(available).max(0.0)
        }
        ActionIntent::Deposit { amount, .. } | ActionIntent::Convert { amount, .. } => *amount,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WithdrawOutcome {
    pub applied: f64,
    pub ordinary_income: f64,
    pub capital_gains: f64,
    pub tax_exempt_income: f64,
    pub penalty: f64,
}

/// Withdraw `amount` from a single holding, applying basis consumption and
/// the early-withdrawal penalty. Returns the zero outcome (no-op) if the
/// holding is missing or the resolved amount is non-positive — the caller
/// logs this as a recovered anomaly.
pub fn withdraw_from_holding(
    state: &mut SimulationState,
    holding_id: HoldingId,
    amount: f64,
    override_treatment: Option<TaxTreatment>,
    skip_penalty: bool,
    age: f64,
    date: Date,
    penalty_rate: f64,
) -> WithdrawOutcome {
    let seasoned_basis_before = state
        .holding(holding_id)
        .map(|h| h.seasoned_basis(date))
        .unwrap_or(0.0);
    let tax_type = match state.holding(holding_id) {
        Some(h) => h.tax_type,
        None => {
            tracing::warn!(?holding_id, "withdraw from missing holding treated as no-op");
            return WithdrawOutcome::default();
        }
    };

    let Some(holding) = state.holding_mut(holding_id) else {
        return WithdrawOutcome::default();
    };

    let w = amount.min(holding.balance).max(0.0);
    if w <= 0.0 {
        return WithdrawOutcome::default();
    }
    let starting_balance = holding.balance;
    holding.balance -= w;

    let mut outcome = WithdrawOutcome {
        applied: w,
        ..Default::default()
    };

    if let Some(treatment) = override_treatment {
        match treatment {
            TaxTreatment::Ordinary => outcome.ordinary_income = w,
            TaxTreatment::CapitalGains => outcome.capital_gains = w,
            TaxTreatment::TaxExempt => outcome.tax_exempt_income = w,
            TaxTreatment::None => {}
        }
    } else {
        match tax_type {
            HoldingTaxType::Taxable => {
                let basis_used = consume_basis(holding, w);
                outcome.capital_gains = (w - basis_used).max(0.0);
            }
            HoldingTaxType::Traditional => outcome.ordinary_income = w,
            HoldingTaxType::Roth => {
                consume_basis(holding, w);
            }
            HoldingTaxType::Hsa => outcome.tax_exempt_income = w,
        }
    }

    if age < 59.5 && !skip_penalty {
        let penalty_base = match tax_type {
            HoldingTaxType::Traditional => w,
            HoldingTaxType::Roth => (w - seasoned_basis_before).max(0.0),
            _ => 0.0,
        };
        if penalty_base > 0.0 {
            outcome.penalty = penalty_base * penalty_rate;
            state.year_ledger.penalties += outcome.penalty;
        }
    }

    state.year_ledger.ordinary_income += outcome.ordinary_income;
    state.year_ledger.capital_gains += outcome.capital_gains;
    state.year_ledger.tax_exempt_income += outcome.tax_exempt_income;
    let _ = starting_balance;
    outcome
}

/// Consume `amount` of basis from a holding's ordered entries per its
/// configured lot method. Returns the basis actually consumed.
fn consume_basis(holding: &mut Holding, amount: f64) -> f64 {
    match holding.lot_method {
        LotMethod::AverageCost => consume_basis_average(holding, amount),
        LotMethod::Fifo => consume_basis_ordered(holding, amount, true),
        LotMethod::Lifo => consume_basis_ordered(holding, amount, false),
    }
}

fn consume_basis_average(holding: &mut Holding, amount: f64) -> f64 {
    let starting_balance = holding.balance + amount;
    if starting_balance <= 0.0 {
        return 0.0;
    }
    let total_basis = holding.total_basis();
    let basis_ratio = total_basis / starting_balance;
    let basis_used = amount * basis_ratio;

    let remaining_fraction = ((starting_balance - amount) / starting_balance).max(0.0);
    for entry in holding.contribution_basis_entries.iter_mut() {
        entry.amount *= remaining_fraction;
    }
    basis_used
}

fn consume_basis_ordered(holding: &mut Holding, amount: f64, ascending: bool) -> f64 {
    holding
        .contribution_basis_entries
        .sort_by(|a, b| if ascending { a.date.cmp(&b.date) } else { b.date.cmp(&a.date) });

    let mut remaining = amount;
    let mut basis_used = 0.0;
    for entry in holding.contribution_basis_entries.iter_mut() {
        if remaining <= 0.0 {
            break;
        }
        let take = entry.amount.min(remaining);
        entry.amount -= take;
        basis_used += take;
        remaining -= take;
    }
    holding
        .contribution_basis_entries
        .retain(|e| e.amount > 1e-9);
    basis_used
}

/// Pro-rata withdrawal across holdings weighted by current balance; the
/// last holding in iteration order absorbs the rounding remainder.
pub fn withdraw_pro_rata(
    state: &mut SimulationState,
    holding_ids: &[HoldingId],
    amount: f64,
    skip_penalty: bool,
    age: f64,
    date: Date,
    penalty_rate: f64,
) -> WithdrawOutcome {
    let total_balance: f64 = holding_ids
        .iter()
        .filter_map(|id| state.holding(*id))
        .map(|h| h.balance)
        .sum();
    if total_balance <= 0.0 || amount <= 0.0 {
        return WithdrawOutcome::default();
    }

    let mut outcome = WithdrawOutcome::default();
    let mut distributed = 0.0;
    for (i, id) in holding_ids.iter().enumerate() {
        let balance = state.holding(*id).map(|h| h.balance).unwrap_or(0.0);
        let share = if i + 1 == holding_ids.len() {
            amount - distributed
        } else {
            amount * (balance / total_balance)
        };
        distributed += share;
        let r = withdraw_from_holding(state, *id, share, None, skip_penalty, age, date, penalty_rate);
        outcome.applied += r.applied;
        outcome.ordinary_income += r.ordinary_income;
        outcome.capital_gains += r.capital_gains;
        outcome.tax_exempt_income += r.tax_exempt_income;
        outcome.penalty += r.penalty;
    }
    outcome
}

/// Deposit `amount` into `target_holding_id` (or the primary cash account if
/// absent), appending a basis entry dated to `date`.
pub fn deposit(
    state: &mut SimulationState,
    target_holding_id: Option<HoldingId>,
    amount: f64,
    from_cash: bool,
    date: Date,
) {
    if amount <= 0.0 {
        return;
    }
    match target_holding_id {
        Some(id) => {
            if from_cash {
                state.adjust_primary_cash(-amount);
            }
            if let Some(holding) = state.holding_mut(id) {
                holding.balance += amount;
                holding
                    .contribution_basis_entries
                    .push(BasisEntry { date, amount });
            } else {
                tracing::warn!(?id, "deposit to missing holding treated as no-op");
            }
        }
        None => state.adjust_primary_cash(amount),
    }
}

/// Convert `amount` from `source` (default: first traditional holding) to
/// `target` (default: first Roth holding). Always `ordinary` treatment on
/// the withdraw side and `skip_penalty=true`.
pub fn convert(
    state: &mut SimulationState,
    source: Option<HoldingId>,
    target: Option<HoldingId>,
    amount: f64,
    age: f64,
    date: Date,
    penalty_rate: f64,
) -> WithdrawOutcome {
    let source_id = source.or_else(|| {
        state
            .holdings
            .iter()
            .find(|h| h.tax_type == HoldingTaxType::Traditional)
            .map(|h| h.id)
    });
    let target_id = target.or_else(|| {
        state
            .holdings
            .iter()
            .find(|h| h.tax_type == HoldingTaxType::Roth)
            .map(|h| h.id)
    });

    let Some(source_id) = source_id else {
        return WithdrawOutcome::default();
    };

    let outcome = withdraw_from_holding(
        state,
        source_id,
        amount,
        Some(TaxTreatment::Ordinary),
        true,
        age,
        date,
        penalty_rate,
    );
    deposit(state, target_id, outcome.applied, false, date);
    outcome
}

/// Execute an already-resolved intent and produce its [`ActionRecord`].
pub fn execute_intent(
    state: &mut SimulationState,
    intent: ActionIntent,
    resolved_amount: f64,
    age: f64,
    date: Date,
    penalty_rate: f64,
) -> ActionRecord {
    let outcome = match intent {
        ActionIntent::Deposit {
            target_holding_id,
            from_cash,
            ..
        } => {
            deposit(state, target_holding_id, resolved_amount, from_cash, date);
            WithdrawOutcome {
                applied: resolved_amount,
                ..Default::default()
            }
        }
        ActionIntent::Withdraw {
            source_holding_id,
            tax_treatment,
            skip_penalty,
            ..
        } => match source_holding_id {
            Some(id) => withdraw_from_holding(
                state,
                id,
                resolved_amount,
                tax_treatment,
                skip_penalty,
                age,
                date,
                penalty_rate,
            ),
            None => {
                let ids: Vec<HoldingId> = state.holdings.iter().map(|h| h.id).collect();
                withdraw_pro_rata(state, &ids, resolved_amount, skip_penalty, age, date, penalty_rate)
            }
        },
        ActionIntent::Convert {
            source_holding_id,
            target_holding_id,
            ..
        } => convert(
            state,
            source_holding_id,
            target_holding_id,
            resolved_amount,
            age,
            date,
            penalty_rate,
        ),
    };

    ActionRecord {
        intent,
        resolved_amount: outcome.applied,
        ordinary_income: outcome.ordinary_income,
        capital_gains: outcome.capital_gains,
        penalty: outcome.penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CashAccount, CashAccountId, HoldingType, InvestmentAccountId};

    fn holding(id: u32, tax_type: HoldingTaxType, balance: f64, method: LotMethod) -> Holding {
        Holding {
            id: HoldingId(id),
            investment_account_id: InvestmentAccountId(0),
            tax_type,
            holding_type: HoldingType::Equity,
            balance,
            contribution_basis_entries: vec![BasisEntry {
                date: jiff::civil::date(2020, 1, 1),
                amount: balance,
            }],
            return_rate: 0.0,
            return_std_dev: 0.0,
            lot_method: method,
        }
    }

    fn state_with(holdings: Vec<Holding>) -> SimulationState {
        let mut s = SimulationState::from_snapshot(&crate::model::SimulationSnapshot {
            scenario: crate::model::Scenario {
                id: crate::model::StrategyId(0),
                person_strategy_ids: vec![],
            },
            people: vec![],
            person_strategies: vec![],
            cash_accounts: vec![CashAccount {
                id: CashAccountId(0),
                balance: 0.0,
                interest_rate: 0.0,
            }],
            investment_accounts: vec![],
            holdings: holdings.clone(),
            reference: crate::model::ReferenceTables {
                contribution_limits: Default::default(),
                federal_tax_policy: crate::model::FederalTaxPolicy {
                    ordinary_brackets: vec![],
                    capital_gains_brackets: vec![],
                    standard_deduction: 0.0,
                },
                ss_provisional_income_brackets: Default::default(),
                irmaa_table: Default::default(),
                rmd_table: crate::model::RmdTable::irs_uniform_lifetime_2024(),
                guardrail_health_points: Default::default(),
                inflation_rates: Default::default(),
                early_withdrawal_penalty_rate: 0.1,
            },
        });
        s.holdings = holdings;
        s
    }

    #[test]
    fn test_roth_seasoned_no_penalty() {
        let mut h = holding(1, HoldingTaxType::Roth, 10_000.0, LotMethod::Fifo);
        h.contribution_basis_entries[0].date = jiff::civil::date(2015, 1, 1);
        let mut state = state_with(vec![h]);
        let date = jiff::civil::date(2020, 1, 1);
        let outcome = withdraw_from_holding(
            &mut state,
            HoldingId(1),
            1_000.0,
            None,
            false,
            50.0,
            date,
            0.1,
        );
        assert_eq!(outcome.penalty, 0.0);
    }

    #[test]
    fn test_roth_unseasoned_full_penalty_base() {
        let mut h = holding(1, HoldingTaxType::Roth, 10_000.0, LotMethod::Fifo);
        h.contribution_basis_entries[0].date = jiff::civil::date(2019, 6, 1);
        let mut state = state_with(vec![h]);
        let date = jiff::civil::date(2020, 1, 1);
        let outcome = withdraw_from_holding(
            &mut state,
            HoldingId(1),
            1_000.0,
            None,
            false,
            50.0,
            date,
            0.1,
        );
        assert!((outcome.penalty - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pro_rata_split() {
        let h1 = holding(1, HoldingTaxType::Taxable, 300.0, LotMethod::Fifo);
        let h2 = holding(2, HoldingTaxType::Taxable, 700.0, LotMethod::Fifo);
        let mut state = state_with(vec![h1, h2]);
        let date = jiff::civil::date(2020, 1, 1);
        withdraw_pro_rata(
            &mut state,
            &[HoldingId(1), HoldingId(2)],
            100.0,
            true,
            70.0,
            date,
            0.1,
        );
        assert!((state.holding(HoldingId(1)).unwrap().balance - 270.0).abs() < 1e-6);
        assert!((state.holding(HoldingId(2)).unwrap().balance - 630.0).abs() < 1e-6);
    }

    #[test]
    fn test_conversion_at_age_50() {
        let trad = holding(1, HoldingTaxType::Traditional, 50_000.0, LotMethod::Fifo);
        let roth = holding(2, HoldingTaxType::Roth, 0.0, LotMethod::Fifo);
        let mut state = state_with(vec![trad, roth]);
        state.holdings[1].contribution_basis_entries.clear();
        let date = jiff::civil::date(2020, 6, 1);
        let outcome = convert(&mut state, None, None, 10_000.0, 50.0, date, 0.1);
        assert_eq!(outcome.ordinary_income, 10_000.0);
        assert_eq!(outcome.penalty, 0.0);
        assert_eq!(state.year_ledger.ordinary_income, 10_000.0);
        assert_eq!(state.year_ledger.penalties, 0.0);
        let roth_holding = state.holding(HoldingId(2)).unwrap();
        assert_eq!(roth_holding.balance, 10_000.0);
        assert_eq!(roth_holding.contribution_basis_entries.len(), 1);
        assert_eq!(roth_holding.contribution_basis_entries[0].amount, 10_000.0);
        assert_eq!(roth_holding.contribution_basis_entries[0].date, date);
    }
}
