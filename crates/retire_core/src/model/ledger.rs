//! Year-scoped tax accumulators and the MAGI history written by the taxes
//! module at the end of each year.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Accumulates within a calendar year; reset to zero at the first month of
/// each year (`monthIndex % 12 == 0`). Values only grow within a year.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct YearLedger {
    pub ordinary_income: f64,
    pub capital_gains: f64,
    pub deductions: f64,
    pub tax_exempt_income: f64,
    pub penalties: f64,
    pub tax_paid: f64,
    pub earned_income: f64,
}

impl YearLedger {
    pub fn reset(&mut self) {
        *self = YearLedger::default();
    }
}

/// `year -> MAGI`, written at end-of-year by the taxes module; consulted by
/// IRMAA lookups two years back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagiHistory {
    pub by_year: FxHashMap<i16, f64>,
}

impl MagiHistory {
    pub fn record(&mut self, year: i16, magi: f64) {
        self.by_year.insert(year, magi);
    }

    pub fn get(&self, year: i16) -> Option<f64> {
        self.by_year.get(&year).copied()
    }
}
