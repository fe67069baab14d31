//! Per-month and per-year rollups of the simulation timeline.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::HoldingId;

/// Point-in-time balance snapshot for one cash account or holding, taken at
/// the end of a month's processing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccountBalanceSnapshot {
    pub holding_id: Option<HoldingId>,
    pub balance: f64,
    /// For Roth holdings: basis seasoned (>= 60 months) vs not.
    pub seasoned_basis: f64,
    pub unseasoned_basis: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub month_index: u32,
    pub date: Date,
    pub age: f64,
    pub income: f64,
    pub spending: f64,
    pub contributions: f64,
    pub withdrawals: f64,
    pub taxes: f64,
    pub ordinary_income: f64,
    pub capital_gains: f64,
    pub deductions: f64,
    pub cash_balance: f64,
    pub investment_balance: f64,
    pub total_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    pub year_index: u32,
    pub date: Date,
    pub age: f64,
    pub income: f64,
    pub spending: f64,
    pub contributions: f64,
    pub withdrawals: f64,
    pub taxes: f64,
    pub ordinary_income: f64,
    pub capital_gains: f64,
    pub deductions: f64,
    pub cash_balance: f64,
    pub investment_balance: f64,
    pub total_balance: f64,
}

impl YearRecord {
    /// Fold the totals of a calendar year's [`MonthlyRecord`]s into one
    /// [`YearRecord`]. Balances and the YTD ledger snapshots
    /// (`ordinary_income`/`capital_gains`/`deductions`) carry the last
    /// month's value forward; only the true per-month deltas are summed.
    pub fn from_months(year_index: u32, months: &[MonthlyRecord]) -> Option<YearRecord> {
        let last = months.last()?;
        Some(YearRecord {
            year_index,
            date: last.date,
            age: last.age,
            income: months.iter().map(|m| m.income).sum(),
            spending: months.iter().map(|m| m.spending).sum(),
            contributions: months.iter().map(|m| m.contributions).sum(),
            withdrawals: months.iter().map(|m| m.withdrawals).sum(),
            taxes: months.iter().map(|m| m.taxes).sum(),
            ordinary_income: last.ordinary_income,
            capital_gains: last.capital_gains,
            deductions: last.deductions,
            cash_balance: last.cash_balance,
            investment_balance: last.investment_balance,
            total_balance: last.total_balance,
        })
    }
}
