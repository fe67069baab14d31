//! Roth conversion ladder: converts from a traditional holding into a Roth
//! holding while the owner's age is in the configured window, filling up to
//! (but not over) a target marginal-bracket threshold.

use crate::input_builder::active_strategies;
use crate::model::{ActionIntent, SimulationContext, SimulationState};

use super::Module;

pub struct RothConversionModule;

impl Module for RothConversionModule {
    fn name(&self) -> &'static str {
        "roth-conversion"
    }

    fn get_action_intents(
        &self,
        state: &SimulationState,
        ctx: &SimulationContext,
    ) -> Vec<ActionIntent> {
        let mut intents = Vec::new();
        for strategy in active_strategies(ctx.snapshot) {
            let Some(conv) = &strategy.roth_conversion else {
                continue;
            };
            if ctx.age < conv.start_age as f64 || ctx.age > conv.end_age as f64 {
                continue;
            }
            // Within `ladder_lead_time_years` of the end of the window a
            // fresh conversion wouldn't season (5 years) before the window
            // closes, so stop topping up the ladder early.
            if let Some(lead_time) = conv.ladder_lead_time_years {
                if conv.end_age as f64 - ctx.age < lead_time as f64 {
                    continue;
                }
            }

            let headroom = (conv.target_bracket_threshold - state.year_ledger.ordinary_income)
                .max(0.0);
            let mut amount = headroom.min(conv.max_conversion);

            if conv.respect_irmaa {
                // MAGI from two years back sets this year's IRMAA tier; cap
                // the conversion so the current year's MAGI doesn't cross
                // into the next surcharge tier above where it already sits.
                let magi_two_years_back =
                    state.magi_history.get(ctx.date.year() - 2).unwrap_or(0.0);
                let current_tier =
                    ctx.snapshot.reference.irmaa_table.surcharge_for_magi(magi_two_years_back);
                let next_threshold = ctx
                    .snapshot
                    .reference
                    .irmaa_table
                    .tiers
                    .iter()
                    .map(|t| t.magi_threshold)
                    .filter(|t| *t > magi_two_years_back)
                    .fold(f64::INFINITY, f64::min);
                if next_threshold.is_finite() {
                    let irmaa_room = (next_threshold - magi_two_years_back).max(0.0);
                    amount = amount.min(irmaa_room);
                }
                let _ = current_tier;
            }

            if amount < conv.min_conversion {
                continue;
            }
            if amount <= 0.0 {
                continue;
            }
            amount = amount.max(conv.min_conversion);

            intents.push(ActionIntent::Convert {
                amount,
                priority: 10,
                source_holding_id: conv.source_holding_id,
                target_holding_id: conv.target_holding_id,
            });
        }
        intents
    }
}
