//! Per-month cashflow contributions emitted by modules.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashflowCategory {
    Work,
    SpendingNeed,
    SpendingWant,
    SpendingHealthcare,
    Tax,
    Event,
    Pension,
    Ssa,
    Interest,
    Other,
}

/// `cash` is signed: positive flows into the primary cash account, negative
/// is an outflow. The tax fields accumulate into the year ledger regardless
/// of the sign of `cash`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CashflowItem {
    pub cash: f64,
    pub ordinary_income: f64,
    pub capital_gains: f64,
    pub deductions: f64,
    pub tax_exempt_income: f64,
}

impl CashflowItem {
    pub fn new(category: CashflowCategory, cash: f64) -> TaggedCashflowItem {
        TaggedCashflowItem {
            category,
            item: CashflowItem {
                cash,
                ..Default::default()
            },
        }
    }
}

/// A [`CashflowItem`] tagged with its category, as emitted by
/// `Module::get_cashflows`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaggedCashflowItem {
    pub category: CashflowCategory,
    pub item: CashflowItem,
}

impl TaggedCashflowItem {
    pub fn with_ordinary_income(mut self, amount: f64) -> Self {
        self.item.ordinary_income = amount;
        self
    }
    pub fn with_tax_exempt_income(mut self, amount: f64) -> Self {
        self.item.tax_exempt_income = amount;
        self
    }
    pub fn with_capital_gains(mut self, amount: f64) -> Self {
        self.item.capital_gains = amount;
        self
    }
    pub fn with_deductions(mut self, amount: f64) -> Self {
        self.item.deductions = amount;
        self
    }
}
