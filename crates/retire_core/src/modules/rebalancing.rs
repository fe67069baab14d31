//! Glidepath rebalancing: compares current holding-type weights against an
//! age-indexed target and trades overweight holdings into underweight ones
//! once drift crosses a threshold.
//!
//! Grounded on the withdraw/deposit primitives in [`crate::tax_lot`]: a
//! rebalance is modeled as a same-day withdraw-then-deposit pair rather than
//! a [`crate::model::ActionIntent::Convert`], so a taxable holding's sale
//! still realizes capital gains through the normal basis-consumption path
//! while tax-advantaged holdings move penalty-free (`skip_penalty=true`,
//! since the balance never leaves the account wrapper).

use rustc_hash::FxHashMap;

use crate::input_builder::active_strategies;
use crate::model::{
    ActionIntent, HoldingId, HoldingType, PersonStrategy, RebalanceFrequency, RebalancingConfig,
    SimulationContext, SimulationState,
};

use super::Module;

pub struct RebalancingModule;

fn active_config<'a>(ctx: &SimulationContext<'a>) -> Option<&'a RebalancingConfig> {
    active_strategies(ctx.snapshot)
        .into_iter()
        .find_map(|s: &PersonStrategy| s.rebalancing.as_ref())
}

fn should_check(config: &RebalancingConfig, ctx: &SimulationContext) -> bool {
    match config.frequency {
        RebalanceFrequency::Monthly => true,
        RebalanceFrequency::Quarterly => ctx.month_index % 3 == 0,
        RebalanceFrequency::Annual => ctx.is_start_of_year,
        RebalanceFrequency::Threshold => true,
    }
}

/// Target weight at `age`, linearly interpolated between the bracketing
/// glidepath points (points must be supplied in ascending age order; the
/// weight saturates at the extremes).
fn target_weights(glidepath: &[crate::model::GlidepathPoint], age: f64) -> FxHashMap<HoldingType, f64> {
    if glidepath.is_empty() {
        return FxHashMap::default();
    }
    if age <= glidepath[0].age {
        return glidepath[0].weights.clone();
    }
    let last = &glidepath[glidepath.len() - 1];
    if age >= last.age {
        return last.weights.clone();
    }
    for w in glidepath.windows(2) {
        let (lo, hi) = (&w[0], &w[1]);
        if age >= lo.age && age <= hi.age {
            let span = hi.age - lo.age;
            let t = if span.abs() < f64::EPSILON {
                0.0
            } else {
                (age - lo.age) / span
            };
            let mut out = FxHashMap::default();
            let mut types: Vec<HoldingType> = lo.weights.keys().chain(hi.weights.keys()).copied().collect();
            types.sort_by_key(|t| *t as u8);
            types.dedup();
            for ty in types {
                let a = lo.weights.get(&ty).copied().unwrap_or(0.0);
                let b = hi.weights.get(&ty).copied().unwrap_or(0.0);
                out.insert(ty, a + t * (b - a));
            }
            return out;
        }
    }
    last.weights.clone()
}

struct Trade {
    holding_id: HoldingId,
    /// Positive: sell this much out of the holding. Negative: buy into it.
    dollar_diff: f64,
}

/// Pair sells against buys with a two-pointer waterfall so the total dollars
/// moved out equals the total moved in, then emit a withdraw/deposit pair
/// for each matched chunk at least `min_trade_amount` in size.
fn build_intents(mut sells: Vec<Trade>, mut buys: Vec<Trade>, min_trade_amount: f64) -> Vec<ActionIntent> {
    let mut intents = Vec::new();
    let (mut si, mut bi) = (0usize, 0usize);
    while si < sells.len() && bi < buys.len() {
        let amount = sells[si].dollar_diff.min(buys[bi].dollar_diff);
        if amount >= min_trade_amount {
            intents.push(ActionIntent::Withdraw {
                amount,
                priority: 30,
                source_holding_id: Some(sells[si].holding_id),
                tax_treatment: None,
                skip_penalty: true,
            });
            intents.push(ActionIntent::Deposit {
                amount,
                priority: 31,
                target_holding_id: Some(buys[bi].holding_id),
                from_cash: false,
            });
        }
        sells[si].dollar_diff -= amount;
        buys[bi].dollar_diff -= amount;
        if sells[si].dollar_diff <= 1e-9 {
            si += 1;
        }
        if buys[bi].dollar_diff <= 1e-9 {
            bi += 1;
        }
    }
    intents
}

impl Module for RebalancingModule {
    fn name(&self) -> &'static str {
        "rebalancing"
    }

    fn get_action_intents(
        &self,
        state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<ActionIntent> {
        let Some(config) = active_config(ctx) else {
            return Vec::new();
        };
        if !should_check(config, ctx) {
            return Vec::new();
        }

        let total: f64 = state.holdings.iter().map(|h| h.balance).sum();
        if total <= 0.0 {
            return Vec::new();
        }

        let targets = target_weights(&config.glidepath, ctx.age);

        let mut by_type: FxHashMap<HoldingType, f64> = FxHashMap::default();
        for h in &state.holdings {
            *by_type.entry(h.holding_type).or_insert(0.0) += h.balance;
        }

        let max_drift = targets
            .iter()
            .map(|(ty, target_weight)| {
                let actual = by_type.get(ty).copied().unwrap_or(0.0) / total;
                (actual - target_weight).abs()
            })
            .fold(0.0_f64, f64::max);
        if max_drift < config.drift_threshold {
            return Vec::new();
        }

        // One representative holding per type: the first in snapshot order.
        let mut representative: FxHashMap<HoldingType, HoldingId> = FxHashMap::default();
        for h in &state.holdings {
            representative.entry(h.holding_type).or_insert(h.id);
        }

        let mut sells = Vec::new();
        let mut buys = Vec::new();
        let mut types: Vec<HoldingType> = by_type.keys().chain(targets.keys()).copied().collect();
        types.sort_by_key(|t| *t as u8);
        types.dedup();
        for ty in types {
            let Some(&holding_id) = representative.get(&ty) else {
                continue;
            };
            let actual_dollars = by_type.get(&ty).copied().unwrap_or(0.0);
            let target_dollars = targets.get(&ty).copied().unwrap_or(0.0) * total;
            let diff = actual_dollars - target_dollars;
            if diff > 0.0 {
                sells.push(Trade { holding_id, dollar_diff: diff });
            } else if diff < 0.0 {
                buys.push(Trade { holding_id, dollar_diff: -diff });
            }
        }

        build_intents(sells, buys, config.min_trade_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GlidepathPoint;

    #[test]
    fn test_target_weights_interpolate() {
        let glidepath = vec![
            GlidepathPoint {
                age: 40.0,
                weights: FxHashMap::from_iter([(HoldingType::Equity, 0.9), (HoldingType::Bond, 0.1)]),
            },
            GlidepathPoint {
                age: 60.0,
                weights: FxHashMap::from_iter([(HoldingType::Equity, 0.5), (HoldingType::Bond, 0.5)]),
            },
        ];
        let w = target_weights(&glidepath, 50.0);
        assert!((w[&HoldingType::Equity] - 0.7).abs() < 1e-9);
        assert!((w[&HoldingType::Bond] - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_target_weights_saturate_at_edges() {
        let glidepath = vec![
            GlidepathPoint {
                age: 40.0,
                weights: FxHashMap::from_iter([(HoldingType::Equity, 0.9)]),
            },
            GlidepathPoint {
                age: 60.0,
                weights: FxHashMap::from_iter([(HoldingType::Equity, 0.5)]),
            },
        ];
        assert_eq!(target_weights(&glidepath, 20.0)[&HoldingType::Equity], 0.9);
        assert_eq!(target_weights(&glidepath, 80.0)[&HoldingType::Equity], 0.5);
    }

    #[test]
    fn test_build_intents_matches_sells_to_buys() {
        let sells = vec![Trade { holding_id: HoldingId(1), dollar_diff: 1000.0 }];
        let buys = vec![Trade { holding_id: HoldingId(2), dollar_diff: 1000.0 }];
        let intents = build_intents(sells, buys, 100.0);
        assert_eq!(intents.len(), 2);
        assert!(matches!(intents[0], ActionIntent::Withdraw { amount, .. } if (amount - 1000.0).abs() < 1e-9));
        assert!(matches!(intents[1], ActionIntent::Deposit { amount, .. } if (amount - 1000.0).abs() < 1e-9));
    }

    #[test]
    fn test_build_intents_skips_below_min_trade() {
        let sells = vec![Trade { holding_id: HoldingId(1), dollar_diff: 50.0 }];
        let buys = vec![Trade { holding_id: HoldingId(2), dollar_diff: 50.0 }];
        let intents = build_intents(sells, buys, 100.0);
        assert!(intents.is_empty());
    }
}
