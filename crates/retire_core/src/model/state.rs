//! The mutable per-run state and the immutable per-month context passed to
//! modules.

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::accounts::{CashAccount, Holding};
use super::ids::{HoldingId, StrategyId};
use super::ledger::{MagiHistory, YearLedger};
use super::snapshot::SimulationSnapshot;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub start_date: Date,
    pub end_date: Date,
    pub months: u32,
    pub step_months: u32,
}

/// Per-strategy counters that persist across months within a run but reset
/// or accumulate on module-specific schedules (contribution limits reset
/// yearly; the Guyton cut counter counts down month by month).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GuardrailRuntimeState {
    pub guyton_remaining_cut_months: u32,
}

/// Which annual limit a contribution draws against; the three are tracked
/// independently even when they target the same holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributionKind {
    Employee401k,
    Employer401k,
    Hsa,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub cash_accounts: Vec<CashAccount>,
    pub holdings: Vec<Holding>,
    pub year_ledger: YearLedger,
    pub magi_history: MagiHistory,
    pub initial_balance: f64,

    /// Contributions made so far in the current calendar year, keyed by
    /// `(holding, contribution kind)` since employee/employer/HSA limits are
    /// tracked independently even when they target the same holding.
    pub ytd_contributions: FxHashMap<(HoldingId, ContributionKind), f64>,
    /// End-of-prior-year holding balances, consulted by the RMD module.
    pub prior_year_end_balances: FxHashMap<HoldingId, f64>,
    pub guardrail_state: FxHashMap<StrategyId, GuardrailRuntimeState>,

    pub min_balance: f64,
    pub max_balance: f64,
}

impl SimulationState {
    pub fn from_snapshot(snapshot: &SimulationSnapshot) -> Self {
        let cash_accounts = snapshot.cash_accounts.clone();
        let holdings = snapshot.holdings.clone();
        let initial_balance = cash_accounts.iter().map(|a| a.balance).sum::<f64>()
            + holdings.iter().map(|h| h.balance).sum::<f64>();
        SimulationState {
            cash_accounts,
            holdings,
            year_ledger: YearLedger::default(),
            magi_history: MagiHistory::default(),
            initial_balance,
            ytd_contributions: FxHashMap::default(),
            prior_year_end_balances: FxHashMap::default(),
            guardrail_state: FxHashMap::default(),
            min_balance: initial_balance,
            max_balance: initial_balance,
        }
    }

    pub fn cash_balance(&self) -> f64 {
        self.cash_accounts.iter().map(|a| a.balance).sum()
    }

    pub fn investment_balance(&self) -> f64 {
        self.holdings.iter().map(|h| h.balance).sum()
    }

    pub fn total_balance(&self) -> f64 {
        self.cash_balance() + self.investment_balance()
    }

    pub fn holding_mut(&mut self, id: HoldingId) -> Option<&mut Holding> {
        self.holdings.iter_mut().find(|h| h.id == id)
    }

    pub fn holding(&self, id: HoldingId) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    /// Credit `amount` to the primary cash account (first in snapshot order).
    /// Positive amounts deposit; negative amounts draw down, transiently
    /// permitting a negative balance within the month.
    pub fn adjust_primary_cash(&mut self, amount: f64) {
        if let Some(acct) = self.cash_accounts.first_mut() {
            acct.balance += amount;
        }
    }
}

/// Immutable per-month context passed to every module hook.
#[derive(Debug, Clone, Copy)]
pub struct SimulationContext<'a> {
    pub snapshot: &'a SimulationSnapshot,
    pub settings: &'a SimulationSettings,
    pub month_index: u32,
    pub year_index: u32,
    pub age: f64,
    pub date: Date,
    pub is_start_of_year: bool,
    pub is_end_of_year: bool,
}

impl<'a> SimulationContext<'a> {
    pub fn date_iso(&self) -> String {
        self.date.to_string()
    }
}
