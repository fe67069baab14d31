//! Applies monthly returns to holdings and interest to cash accounts.
//!
//! In deterministic mode each holding grows by `return_rate/12`. In
//! stochastic mode a seeded draw (`Normal(return_rate/12, return_std_dev/
//! sqrt(12))`) is consumed per holding per month in holding order, so the
//! PRNG stream is reproducible for a given seed.

use std::cell::RefCell;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::model::{HoldingId, SimulationContext, SimulationState};

use super::Module;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketReturn {
    pub holding_id: HoldingId,
    pub before_balance: f64,
    pub after_balance: f64,
}

pub struct ReturnsCoreModule {
    rng: RefCell<Option<SmallRng>>,
}

impl ReturnsCoreModule {
    pub fn deterministic() -> Self {
        ReturnsCoreModule {
            rng: RefCell::new(None),
        }
    }

    pub fn stochastic(seed: u64) -> Self {
        ReturnsCoreModule {
            rng: RefCell::new(Some(SmallRng::seed_from_u64(seed))),
        }
    }
}

impl Default for ReturnsCoreModule {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl ReturnsCoreModule {
    /// Advances every holding and cash account by one month of return and
    /// returns the before/after snapshot the scheduler passes to
    /// `on_market_returns`.
    pub fn apply_returns(&self, state: &mut SimulationState) -> Vec<MarketReturn> {
        let mut rng = self.rng.borrow_mut();
        let mut results = Vec::with_capacity(state.holdings.len());

        for holding in state.holdings.iter_mut() {
            let before = holding.balance;
            let monthly_rate = match rng.as_mut() {
                Some(r) => {
                    let mean = holding.return_rate / 12.0;
                    let std_dev = holding.return_std_dev / 12.0_f64.sqrt();
                    if std_dev > 0.0 {
                        Normal::new(mean, std_dev)
                            .map(|dist| dist.sample(r))
                            .unwrap_or(mean)
                    } else {
                        mean
                    }
                }
                None => holding.return_rate / 12.0,
            };
            holding.balance *= 1.0 + monthly_rate;
            results.push(MarketReturn {
                holding_id: holding.id,
                before_balance: before,
                after_balance: holding.balance,
            });
        }

        for account in state.cash_accounts.iter_mut() {
            account.balance *= 1.0 + account.interest_rate / 12.0;
        }

        results
    }
}

impl Module for ReturnsCoreModule {
    fn name(&self) -> &'static str {
        "returns-core"
    }

    fn produce_market_returns(&self, state: &mut SimulationState) -> Option<Vec<MarketReturn>> {
        Some(self.apply_returns(state))
    }
}
