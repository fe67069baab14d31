//! Structured per-month, per-module explanation trace.

use serde::{Deserialize, Serialize};

use super::records::AccountBalanceSnapshot;

/// Totals contributed by a single module during a single month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleRunExplanation {
    pub module_name: &'static str,
    pub cashflow_total: f64,
    pub ordinary_income_total: f64,
    pub capital_gains_total: f64,
    pub action_total: f64,
    pub action_count: u32,
    /// Guardrail/interpolated want-scaling factor applied this month, if the
    /// module computed one (spending module with a guardrail configured).
    pub guardrail_factor: Option<f64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthExplanation {
    pub month_index: u32,
    pub modules: Vec<ModuleRunExplanation>,
    pub balances: Vec<AccountBalanceSnapshot>,
}
